//! Integration tests for mantweak
//!
//! These tests verify that the components work together correctly

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{BufReader, Cursor, Write};

use mantweak::format::{ColumnDetector, ColumnRules, FixedWidth, MarginStack, Table};
use mantweak::parser::{classify, LineKind, LineSource};
use mantweak::process::{format_stream, EngineState};
use mantweak::{format_str, Config, ConfigError};

fn run(input: &[u8], config: &Config) -> String {
    let reader = BufReader::new(Cursor::new(input));
    let mut output = Vec::new();
    format_stream(reader, &mut output, config).unwrap();
    String::from_utf8(output).unwrap()
}

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_format_stream_scenarios() {
    let config = Config {
        levels: 2,
        ..Default::default()
    };
    assert_eq!(run(b"  Hello\n", &config), "Hello\n");
    assert_eq!(run(b"  Hello\n    World\n", &config), "Hello\n World\n");
    assert_eq!(run(b"- item\n", &config), "- item\n");
}

#[test]
fn test_invalid_utf8_is_not_rejected() {
    let output = run(b"  caf\xff au lait\n", &Config::default());
    assert_eq!(output, "caf\u{fffd} au lait\n");
}

#[test]
fn test_crlf_and_missing_final_newline() {
    let output = run(b"  one\r\n  two", &Config::default());
    assert_eq!(output, "one\ntwo");
}

#[test]
fn test_margin_never_exceeds_indentation() {
    let input = "\
TITLE
   first
        second
      third
  fourth
            fifth  column
            sixth  column
 seventh
\t\ttabbed
";
    for levels in 1..=4 {
        for reserve in [false, true] {
            let mut stack = MarginStack::new(levels, reserve);
            let mut source = LineSource::new(Cursor::new(input.as_bytes()));
            let mut previous = None;
            while let Some(raw) = source.next_line().unwrap() {
                let was_table = previous.is_some_and(|p: mantweak::parser::LineInfo| {
                    p.kind == LineKind::TableRow
                });
                let mut line = classify(raw, 8, was_table);
                line.margin = stack.resolve(&line, previous.as_ref());
                assert!(line.margin <= line.leading_spaces || line.is_empty());

                let set: Vec<usize> = stack.stops().iter().copied().filter(|&s| s > 0).collect();
                assert!(set.windows(2).all(|w| w[0] < w[1]), "{:?}", stack.stops());
                previous = Some(line.info());
            }
        }
    }
}

#[test]
fn test_table_rows_are_emitted_in_input_order() {
    let config = Config::default();
    let metrics = FixedWidth;
    let mut engine = EngineState::new(&config, &metrics);
    let mut output = Vec::new();

    let mut source =
        LineSource::from_string("   -a  one\n   -b  two\n   -c  three\n   -d  four\nend\n");
    let mut buffered = Vec::new();
    while let Some(raw) = source.next_line().unwrap() {
        engine.process_line(&mut output, raw).unwrap();
        buffered.push(engine.buffered_rows());
    }
    engine.finish(&mut output).unwrap();

    // four rows pile up, the flush-left paragraph closes the table
    assert_eq!(buffered, vec![1, 2, 3, 4, 0]);
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "-a\tone\n-b\ttwo\n-c\tthree\n-d\tfour\nend\n"
    );
}

#[test]
fn test_columns_partition_the_grid() {
    let rows = [
        "-a  one   x",
        "-bb two   yy",
        "-c  three  z",
        "    continued",
    ];
    let mut lines = rows.iter().map(|text| {
        let mut line = classify(mantweak::parser::RawLine::new(*text), 8, true);
        line.kind = LineKind::TableRow;
        line
    });
    let mut table = Table::new(lines.next().unwrap());
    for line in lines {
        table.push(line);
    }

    let metrics = FixedWidth;
    let detector = ColumnDetector::new(&metrics, ColumnRules::default(), 8);
    let grid = table.grid(8);
    let columns = detector.detect(&grid);

    let max_length = Table::max_length(&grid);
    assert_eq!(columns.first().map(|c| c.start), Some(0));
    assert_eq!(columns.last().map(|c| c.end()), Some(max_length));
    for pair in columns.windows(2) {
        assert_eq!(pair[0].end(), pair[1].start);
    }
    for column in &columns {
        assert_eq!(column.rendered_width % 8, 0);
        assert!(column.rendered_width >= column.content_width);
    }
}

#[test]
fn test_width_table_changes_alignment() {
    let widths = write_temp("default = 1\nunit = 1\n\n[glyphs]\n\"W\" = 3\n");
    let input = b"WWW  x\na    y\n";

    let fixed = run(input, &Config::default());
    assert_eq!(fixed, "WWW\tx\na\ty\n");

    let config = Config {
        font: Some(widths.path().to_path_buf()),
        ..Default::default()
    };
    // the first column is 11 units wide and pushes the second to 16
    assert_eq!(run(input, &config), "WWW\tx\na\t\ty\n");
}

#[test]
fn test_cell_widths_change_alignment() {
    let input = "\u{4e2d}\u{6587}\u{5b57}\u{5178}  x\nab    y\n";

    let fixed = format_str(input, &Config::default()).unwrap();
    assert_eq!(fixed, "\u{4e2d}\u{6587}\u{5b57}\u{5178}\tx\nab\ty\n");

    let config = Config {
        cells: true,
        ..Default::default()
    };
    assert_eq!(
        format_str(input, &config).unwrap(),
        "\u{4e2d}\u{6587}\u{5b57}\u{5178}\tx\nab\t\ty\n"
    );
}

#[test]
fn test_config_file_drives_formatting() {
    let file = write_temp("levels = 2\nblank_lines = true\n");
    let config = Config::from_toml_file(file.path()).unwrap();
    assert!(config.validate().is_ok());

    let output = format_str("  Hello\n    World\n", &config).unwrap();
    // no reserved space once blank lines mark the levels
    assert_eq!(output, "Hello\nWorld\n");
}

#[test]
fn test_bad_configuration_is_reported() {
    let config = Config {
        tabstop: 1,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Tabstop(1))));

    let widths = write_temp("default = 0\n");
    let config = Config {
        font: Some(widths.path().to_path_buf()),
        ..Default::default()
    };
    let err = format_str("text\n", &config).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::FontInvalid { .. })
    ));
}

#[test]
fn test_oversized_width_table_is_rejected_before_input() {
    let widths = write_temp("default = 3000000000\nunit = 1\n");
    let config = Config {
        font: Some(widths.path().to_path_buf()),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
    assert!(matches!(
        config.glyph_metrics(),
        Err(ConfigError::FontInvalid { .. })
    ));

    let err = format_str("-a  one\n-b  two\n", &config).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::FontInvalid { .. })
    ));
}
