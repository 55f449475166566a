//! Blocking per-line iteration

use super::{Flow, Traversal};
use crate::config::ReaderConfig;
use crate::error::Result;
use crate::reader::LineReader;
use crate::source::ByteSource;
use std::path::Path;

/// Call `consumer` with every line of the file at `path` and whether it is
/// the last one.
///
/// Returning `false` (or [`Flow::Stop`]) stops early; returning `()` or
/// `true` continues. The file is closed before this function returns, also
/// when reading fails or the consumer panics.
///
/// ```no_run
/// use linewise_core::{each_line_sync, ReaderConfig};
///
/// let traversal = each_line_sync("data.csv", &ReaderConfig::default(), |line, last| {
///     println!("{line}{}", if last { " (end)" } else { "" });
/// })?;
/// println!("{} lines", traversal.lines);
/// # Ok::<(), linewise_core::LineError>(())
/// ```
pub fn each_line_sync<P, F, R>(path: P, config: &ReaderConfig, consumer: F) -> Result<Traversal>
where
    P: AsRef<Path>,
    F: FnMut(String, bool) -> R,
    R: Into<Flow>,
{
    let reader = LineReader::open(path, config)?;
    each_line_sync_from_reader(reader, consumer)
}

/// [`each_line_sync`] over an already open reader
pub fn each_line_sync_from_reader<S, F, R>(
    mut reader: LineReader<S>,
    mut consumer: F,
) -> Result<Traversal>
where
    S: ByteSource,
    F: FnMut(String, bool) -> R,
    R: Into<Flow>,
{
    let mut traversal = Traversal::default();

    while reader.has_next_line() {
        let line = match reader.next_line() {
            Ok(line) => line,
            Err(e) => {
                if let Err(close_err) = reader.close() {
                    log::warn!("closing after failed read also failed: {close_err}");
                }
                return Err(e);
            }
        };
        let last = !reader.has_next_line();
        traversal.lines += 1;

        if consumer(line, last).into().is_stop() {
            traversal.stopped_early = true;
            break;
        }
    }

    reader.close()?;
    Ok(traversal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn reader(content: &str, buffer_size: usize) -> LineReader<MemorySource> {
        let config = ReaderConfig::builder()
            .buffer_size(buffer_size)
            .build()
            .unwrap();
        LineReader::from_source(MemorySource::from(content), &config).unwrap()
    }

    #[test]
    fn test_last_flag_only_on_final_line() {
        let mut seen = Vec::new();
        let traversal = each_line_sync_from_reader(reader("a\nb\nc", 2), |line, last| {
            seen.push((line, last));
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), false),
                ("b".to_string(), false),
                ("c".to_string(), true)
            ]
        );
        assert_eq!(traversal.lines, 3);
        assert!(!traversal.stopped_early);
    }

    #[test]
    fn test_stop_on_false() {
        let mut seen = Vec::new();
        let traversal = each_line_sync_from_reader(reader("1\n2\n3\n4", 2), |line, _| {
            seen.push(line);
            seen.len() < 2
        })
        .unwrap();
        assert_eq!(seen, vec!["1", "2"]);
        assert!(traversal.stopped_early);
    }

    #[test]
    fn test_empty_input_never_calls_consumer() {
        let traversal = each_line_sync_from_reader(reader("", 8), |_, _| -> Flow {
            panic!("no lines expected")
        })
        .unwrap();
        assert_eq!(traversal, Traversal::default());
    }
}
