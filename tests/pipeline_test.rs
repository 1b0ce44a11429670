// End-to-end tests for the clipboard → SVG pipeline using a scripted clipboard
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use clipper::clipboard::{ClipboardBackend, ClipboardWatcher, RetryPolicy, WatchMode};
use clipper::crop::BoundingBox;
use clipper::error::AppError;
use clipper::highlight::{Highlighter, OutputFormat};
use clipper::pipeline::{IterationOutcome, Pipeline, PipelineOptions, PipelineState, SkipReason};
use clipper::settings::ClipboardOutput;
use clipper::storage::ArtifactStore;
use regex::Regex;

const C_SNIPPET: &str = "int main() {\n  return 0;\n}\n";

/// Returns queued values in order, then keeps returning the last value
struct ScriptedClipboard {
    reads: VecDeque<String>,
    current: String,
    writes: Vec<String>,
}

impl ScriptedClipboard {
    fn new(reads: &[&str]) -> Self {
        Self {
            reads: reads.iter().map(|s| s.to_string()).collect(),
            current: String::new(),
            writes: Vec::new(),
        }
    }
}

impl ClipboardBackend for ScriptedClipboard {
    fn get_text(&mut self) -> Result<String, AppError> {
        if let Some(next) = self.reads.pop_front() {
            self.current = next;
        }
        Ok(self.current.clone())
    }

    fn set_text(&mut self, text: &str) -> Result<(), AppError> {
        self.current = text.to_string();
        self.writes.push(text.to_string());
        Ok(())
    }
}

fn options(lexer: &str) -> PipelineOptions {
    PipelineOptions {
        lexer: lexer.to_string(),
        format: OutputFormat::Svg,
        line_numbers: false,
        crop: false,
        font_size: 14,
        clipboard_output: ClipboardOutput::Off,
        ignore_own_output: true,
        retry: RetryPolicy {
            attempts: 1,
            base_delay_ms: 1,
            max_delay_ms: 1,
        },
    }
}

fn pipeline(dir: &Path, reads: &[&str], options: PipelineOptions) -> Pipeline<ScriptedClipboard> {
    let watcher = ClipboardWatcher::new(ScriptedClipboard::new(reads), WatchMode::Poll, 1);
    let highlighter = Highlighter::new().expect("highlighter should load");
    let store = ArtifactStore::open(dir).expect("output dir should be creatable");
    Pipeline::new(watcher, highlighter, store, options)
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn root_size(svg: &str) -> (u32, u32) {
    let re = Regex::new(r#"<svg height="(\d+)" width="(\d+)""#).unwrap();
    let caps = re.captures(svg).expect("root element should carry size attributes");
    (caps[1].parse().unwrap(), caps[2].parse().unwrap())
}

#[test]
fn exports_cropped_c_snippet() {
    let tmp = tempfile::tempdir().unwrap();
    let mut opts = options("c");
    opts.crop = true;
    let mut pipeline = pipeline(tmp.path(), &["", C_SNIPPET], opts);

    let outcome = pipeline.step();
    let artifact = match outcome {
        IterationOutcome::Exported {
            artifact,
            bounding_box,
            copied_to_clipboard,
        } => {
            assert_eq!(bounding_box, Some(BoundingBox { height: 52, width: 109 }));
            assert!(!copied_to_clipboard);
            artifact
        }
        other => panic!("expected export, got {other:?}"),
    };
    assert_eq!(pipeline.state(), PipelineState::Waiting);

    let names = files_in(tmp.path());
    assert_eq!(names.len(), 1);
    assert!(Regex::new(r"^\d+\.svg$").unwrap().is_match(&names[0]), "{}", names[0]);

    let svg = fs::read_to_string(&artifact.path).unwrap();
    let (height, width) = root_size(&svg);
    assert!(height > 0 && width > 0);
    assert_eq!(svg.matches("<svg").count(), 1);
    assert!(svg.contains(">int</tspan>"), "{svg}");
    assert!(svg.contains(">return</tspan>"), "{svg}");
    assert!(pipeline.watcher().clipboard().writes.is_empty());
}

#[test]
fn empty_clipboard_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let mut opts = options("c");
    opts.clipboard_output = ClipboardOutput::Text;
    let mut pipeline = pipeline(tmp.path(), &["previous", ""], opts);

    let outcome = pipeline.step();
    assert!(matches!(outcome, IterationOutcome::Skipped(SkipReason::EmptyClipboard)));
    assert!(files_in(tmp.path()).is_empty());
    assert!(pipeline.watcher().clipboard().writes.is_empty());
}

#[test]
fn whitespace_only_clipboard_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let mut pipeline = pipeline(tmp.path(), &["", "  \n\t"], options("c"));
    assert!(matches!(pipeline.step(), IterationOutcome::Skipped(_)));
    assert!(files_in(tmp.path()).is_empty());
}

#[test]
fn unknown_lexer_fails_iteration_and_keeps_waiting() {
    let tmp = tempfile::tempdir().unwrap();
    let mut pipeline = pipeline(tmp.path(), &["", "first", "second"], options("not-a-real-language"));

    let first = pipeline.step();
    assert!(matches!(first, IterationOutcome::Failed(AppError::UnknownLexer(_))));
    assert_eq!(pipeline.state(), PipelineState::Waiting);

    let second = pipeline.step();
    assert!(matches!(second, IterationOutcome::Failed(AppError::UnknownLexer(_))));
    assert!(files_in(tmp.path()).is_empty());
}

#[test]
fn file_reference_mode_is_unimplemented() {
    let tmp = tempfile::tempdir().unwrap();
    let mut opts = options("c");
    opts.clipboard_output = ClipboardOutput::File;
    let mut pipeline = pipeline(tmp.path(), &["", C_SNIPPET], opts);

    let outcome = pipeline.step();
    assert!(matches!(outcome, IterationOutcome::Failed(AppError::Unimplemented(_))));
    assert!(files_in(tmp.path()).is_empty());
    assert!(pipeline.watcher().clipboard().writes.is_empty());
}

#[test]
fn overwrite_text_copies_svg_and_ignores_own_write() {
    let tmp = tempfile::tempdir().unwrap();
    let mut opts = options("c");
    opts.clipboard_output = ClipboardOutput::Text;
    let mut pipeline = pipeline(tmp.path(), &["", C_SNIPPET], opts);

    let outcome = pipeline.step();
    assert!(matches!(outcome, IterationOutcome::Exported { copied_to_clipboard: true, .. }));

    let writes = &pipeline.watcher().clipboard().writes;
    assert_eq!(writes.len(), 1);
    assert!(writes[0].contains("<svg"));
    assert_eq!(pipeline.watcher().last_seen(), writes[0]);
}

#[test]
fn reprocessing_own_output_treats_svg_as_new_input() {
    let tmp = tempfile::tempdir().unwrap();
    let mut opts = options("c");
    opts.clipboard_output = ClipboardOutput::Text;
    opts.ignore_own_output = false;
    let mut pipeline = pipeline(tmp.path(), &["", C_SNIPPET], opts);

    assert!(matches!(pipeline.step(), IterationOutcome::Exported { .. }));
    // the clipboard now holds the SVG written back last round, which the watcher has not seen
    assert!(matches!(pipeline.step(), IterationOutcome::Exported { .. }));
    assert_eq!(files_in(tmp.path()).len(), 2);
}

#[test]
fn line_numbers_widen_cropped_box() {
    let tmp = tempfile::tempdir().unwrap();
    let mut plain = options("c");
    plain.crop = true;
    let mut numbered = plain.clone();
    numbered.line_numbers = true;

    let plain_box = match pipeline(tmp.path(), &["", C_SNIPPET], plain).step() {
        IterationOutcome::Exported { bounding_box, .. } => bounding_box.unwrap(),
        other => panic!("expected export, got {other:?}"),
    };
    let numbered_box = match pipeline(tmp.path(), &["", C_SNIPPET], numbered).step() {
        IterationOutcome::Exported { bounding_box, .. } => bounding_box.unwrap(),
        other => panic!("expected export, got {other:?}"),
    };

    assert_eq!(plain_box.height, numbered_box.height);
    assert!(numbered_box.width > plain_box.width);
}
