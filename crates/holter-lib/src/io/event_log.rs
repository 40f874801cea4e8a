use crate::error::EventError;
use crate::events::{WaveEvent, WaveType};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Parse an event log held in memory.
///
/// One event per line, no header: `wave_type,onset_ms,offset_ms[,tag...]`.
/// Every field after the offset is a tag; blank tags are dropped.
pub fn parse_event_log(text: &str) -> Result<Vec<WaveEvent>, EventError> {
    read_events(text.as_bytes())
}

/// Read an event log from disk.
pub fn read_event_log(path: &Path) -> Result<Vec<WaveEvent>, EventError> {
    let file = File::open(path).map_err(|source| EventError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_events(file)
}

fn read_events<R: Read>(source: R) -> Result<Vec<WaveEvent>, EventError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);
    let mut events = Vec::new();
    for result in reader.records() {
        let record = result?;
        events.push(event_from_record(&record)?);
    }
    log::debug!("parsed {} wave events", events.len());
    Ok(events)
}

fn event_from_record(record: &StringRecord) -> Result<WaveEvent, EventError> {
    let line = record.position().map_or(0, |pos| pos.line() as usize);
    let field = |idx: usize, name: &str| {
        record
            .get(idx)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| EventError::malformed(line, format!("missing {} field", name)))
    };
    let wave_type = WaveType::from_label(field(0, "wave type")?);
    let onset_ms = parse_ms(line, "onset", field(1, "onset")?)?;
    let offset_ms = parse_ms(line, "offset", field(2, "offset")?)?;
    if offset_ms < onset_ms {
        return Err(EventError::malformed(
            line,
            format!("offset {} precedes onset {}", offset_ms, onset_ms),
        ));
    }
    let tags = record
        .iter()
        .skip(3)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect();
    Ok(WaveEvent {
        wave_type,
        onset_ms,
        offset_ms,
        tags,
    })
}

fn parse_ms(line: usize, name: &str, value: &str) -> Result<u64, EventError> {
    value.parse::<u64>().map_err(|_| {
        EventError::malformed(
            line,
            format!("{} is not a non-negative integer: {:?}", name, value),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn parses_rows_with_and_without_tags() {
        let text = "P,120,200\nQRS,210,300,premature\n\nT,320,560,premature, noise ,\n";
        let events = parse_event_log(text).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].wave_type, WaveType::P);
        assert!(events[0].tags.is_empty());
        assert_eq!(events[1].onset_ms, 210);
        assert_eq!(events[1].tags, vec!["premature".to_string()]);
        assert_eq!(
            events[2].tags,
            vec!["premature".to_string(), "noise".to_string()]
        );
    }

    #[test]
    fn unknown_wave_labels_are_kept() {
        let events = parse_event_log("INV,0,10\n").unwrap();
        assert_eq!(events[0].wave_type, WaveType::Other("INV".into()));
    }

    #[test]
    fn rejects_missing_offset() {
        match parse_event_log("P,0,10\nQRS,20\n") {
            Err(EventError::MalformedEvent { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("offset"));
            }
            other => panic!("expected MalformedEvent, got {:?}", other),
        }
    }

    #[test]
    fn rejects_non_numeric_onset() {
        match parse_event_log("QRS,abc,100\n") {
            Err(EventError::MalformedEvent { line, reason }) => {
                assert_eq!(line, 1);
                assert!(reason.contains("onset"));
            }
            other => panic!("expected MalformedEvent, got {:?}", other),
        }
        assert!(parse_event_log("QRS,-5,100\n").is_err());
    }

    #[test]
    fn rejects_offset_before_onset() {
        let err = parse_event_log("QRS,500,400\n").unwrap_err();
        assert!(err.to_string().contains("precedes onset"));
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "QRS,0,90,premature").unwrap();
        writeln!(file, "QRS,900,990").unwrap();
        let events = read_event_log(file.path()).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_event_log(&PathBuf::from("/nonexistent/record.csv")).unwrap_err();
        assert!(matches!(err, EventError::Io { .. }));
        assert!(err.to_string().contains("record.csv"));
    }

    #[test]
    fn reads_sample_fixture() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .and_then(|p| p.parent())
            .expect("workspace root")
            .join("test_data/short_record.csv");
        let events = read_event_log(&path).expect("read fixture");
        assert!(events.iter().any(|e| e.wave_type == WaveType::Qrs));
        assert!(events.iter().any(|e| e.has_tag_containing("premature")));
    }
}
