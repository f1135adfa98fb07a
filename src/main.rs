//! Main entry point for the parzip CLI application.
//!
//! This binary provides a command-line interface for listing, verifying,
//! and extracting ZIP archives through a shared memory mapping.

use anyhow::Result;
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parzip::{Cli, ZipEntry, ZipReader};

/// Application entry point.
///
/// Parses command-line arguments, opens the archive, and dispatches to
/// the list, test, or extract mode.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let reader = ZipReader::open(&cli.file)?;

    // List mode: display archive contents and exit
    if cli.list || cli.verbose {
        return list_files(&reader, cli.verbose);
    }

    // Test mode: verify every entry's CRC across worker threads
    if cli.test {
        return test_archive(&reader, &cli);
    }

    // Extract mode: apply filters to determine which files to extract:
    // 1. Skip directories (they are created automatically during extraction)
    // 2. If specific files are requested, only include matching entries
    // 3. Exclude files matching the exclusion patterns
    let files_to_extract: Vec<&ZipEntry> = reader
        .entries()
        .filter(|e| {
            // Skip directory entries
            if e.is_directory() {
                return false;
            }

            // If specific files are requested via positional arguments,
            // only include entries that match
            if !cli.files.is_empty() {
                let matches = cli.files.iter().any(|f| {
                    if has_glob_chars(f) {
                        // Pattern contains wildcards: use glob matching
                        glob_match(f, &e.name)
                    } else {
                        // No wildcards: exact match on filename or full path
                        let basename = Path::new(&e.name)
                            .file_name()
                            .map(|s| s.to_string_lossy())
                            .unwrap_or_default();
                        e.name == *f || basename == *f
                    }
                });
                if !matches {
                    return false;
                }
            }

            // Exclude files matching the -x patterns
            if cli
                .exclude
                .iter()
                .any(|x| e.name.contains(x) || glob_match(x, &e.name))
            {
                return false;
            }

            true
        })
        .collect();

    // Extract each matching file
    let multiple_files = cli.pipe && files_to_extract.len() > 1;
    for entry in files_to_extract {
        extract_file(&reader, entry, &cli, multiple_files)?;
    }

    Ok(())
}

/// List files in the ZIP archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-v`): Table with sizes and compression ratio
fn list_files(reader: &ZipReader, verbose: bool) -> Result<()> {
    if verbose {
        // Print table header for verbose output
        println!("{:>12}  {:>12}  {:>5}  Name", "Length", "Size", "Cmpr");
        println!("{}", "-".repeat(60));
    }

    // Track totals for summary line
    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in reader.entries() {
        if verbose {
            println!(
                "{:>12}  {:>12}  {}  {}",
                entry.uncompressed_size,
                entry.compressed_size,
                ratio(entry.compressed_size, entry.uncompressed_size),
                entry.name
            );

            // Accumulate totals (excluding directories)
            if !entry.is_directory() {
                total_uncompressed += entry.uncompressed_size;
                total_compressed += entry.compressed_size;
                file_count += 1;
            }
        } else {
            // Simple format: just the file name
            println!("{}", entry.name);
        }
    }

    // Print summary line in verbose mode
    if verbose {
        println!("{}", "-".repeat(60));
        println!(
            "{:>12}  {:>12}  {}  {} files",
            total_uncompressed,
            total_compressed,
            ratio(total_compressed, total_uncompressed),
            file_count
        );
    }

    Ok(())
}

/// Compression ratio as percentage saved.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 {
        format!("{:>4}%", 100 - (compressed * 100 / uncompressed))
    } else {
        "  0%".to_string()
    }
}

/// Verify the CRC-32 of every file entry, fanning the work out over
/// threads.
///
/// Each worker walks a strided subset of the entries and extracts through
/// the one shared reader; reads never contend, so the workers need no
/// coordination beyond collecting their results.
fn test_archive(reader: &ZipReader, cli: &Cli) -> Result<()> {
    let threads = cli
        .threads
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
        .max(1);

    let entries: Vec<&ZipEntry> = reader.entries().filter(|e| !e.is_directory()).collect();

    let mut failures: Vec<String> = Vec::new();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|worker| {
                let entries = &entries;
                scope.spawn(move || {
                    let mut bad = Vec::new();
                    for entry in entries.iter().skip(worker).step_by(threads) {
                        match reader.read_entry(entry) {
                            Ok(data) if crc32fast::hash(&data) == entry.crc32 => {}
                            Ok(_) => bad.push(format!("{}: CRC mismatch", entry.name)),
                            Err(err) => bad.push(format!("{}: {err}", entry.name)),
                        }
                    }
                    bad
                })
            })
            .collect();
        for handle in handles {
            failures.extend(handle.join().expect("integrity worker panicked"));
        }
    });

    if failures.is_empty() {
        if !cli.is_quiet() {
            println!(
                "No errors detected in {} ({} files)",
                cli.file.display(),
                entries.len()
            );
        }
        Ok(())
    } else {
        for failure in &failures {
            eprintln!("{failure}");
        }
        anyhow::bail!(
            "{} of {} files failed verification",
            failures.len(),
            entries.len()
        )
    }
}

/// Extract a single file from the archive.
///
/// Handles the extraction options:
/// - Pipe mode (`-p`): Write to stdout instead of file
/// - Custom output directory (`-d`): Extract to specified directory
/// - Junk paths (`-j`): Ignore directory structure in archive
/// - Overwrite control (`-n`, `-o`): Handle existing files
fn extract_file(
    reader: &ZipReader,
    entry: &ZipEntry,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    // Pipe mode: write file contents directly to stdout
    if cli.pipe {
        let data = reader.read_entry(entry)?;
        let mut stdout = std::io::stdout().lock();
        if show_filename {
            writeln!(stdout, "--- {} ---", entry.name)?;
        }
        stdout.write_all(&data)?;
        return Ok(());
    }

    // Determine the output path based on CLI options
    let file_name = if cli.junk_paths {
        // Junk paths: use only the base filename, ignore directory structure
        Path::new(&entry.name)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| entry.name.clone())
    } else {
        // Preserve directory structure from archive
        entry.name.clone()
    };
    let output_path = match &cli.extract_dir {
        Some(dir) => dir.join(&file_name),
        None => PathBuf::from(&file_name),
    };

    // Handle existing files based on overwrite options
    if output_path.exists() {
        if cli.never_overwrite {
            // -n flag: never overwrite, skip silently (unless quiet)
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (file exists)", entry.name);
            }
            return Ok(());
        }

        if !cli.overwrite {
            // Default behavior: skip with suggestion to use -o
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (use -o to overwrite)", entry.name);
            }
            return Ok(());
        }
        // -o flag: overwrite without prompting (fall through to extraction)
    }

    // Display extraction progress
    if !cli.is_quiet() {
        println!("  extracting: {}", entry.name);
    }

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let data = reader.read_entry(entry)?;
    fs::write(&output_path, data)?;

    Ok(())
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    /// Recursive helper function for glob matching.
    ///
    /// Uses a simple backtracking algorithm to handle `*` wildcards.
    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            // Both exhausted: match successful
            (None, None) => true,
            // Star matches zero or more characters
            (Some('*'), _) => {
                // Try matching zero characters (skip the star)
                // OR matching one character (keep the star for more)
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            // Question mark matches exactly one character
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            // Literal character match
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            // No match
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}
