use async_trait::async_trait;
use doc2pdf_core::contract::{Converter, ConverterFactory, MockConverter};
use doc2pdf_core::dispatch::{dispatch, partition};
use doc2pdf_core::model::{Source, WorkItem};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

type Batches = Arc<Mutex<Vec<(PathBuf, Vec<PathBuf>)>>>;

/// Records every batch it is handed and reports each file as processed.
struct RecordingConverter {
    output_dir: PathBuf,
    batches: Batches,
}

#[async_trait]
impl Converter for RecordingConverter {
    async fn process(&self, paths: Vec<PathBuf>) -> usize {
        let count = paths.len();
        self.batches
            .lock()
            .unwrap()
            .push((self.output_dir.clone(), paths));
        count
    }
}

#[derive(Default)]
struct RecordingFactory {
    batches: Batches,
}

impl ConverterFactory for RecordingFactory {
    fn name(&self) -> &str {
        "recording"
    }

    fn create(&self, output_dir: &Path) -> Box<dyn Converter> {
        Box::new(RecordingConverter {
            output_dir: output_dir.to_path_buf(),
            batches: Arc::clone(&self.batches),
        })
    }
}

fn named(source: &str, internal: &str) -> WorkItem {
    WorkItem::new(
        PathBuf::from("/in").join(source).join(internal),
        Source::named(source),
        PathBuf::from(internal),
    )
}

#[test]
fn partition_is_exhaustive_and_disjoint() {
    let items = vec![
        named("report", "slides/a.pptx"),
        WorkItem::direct(PathBuf::from("/loose/x.pptx")),
        named("report", "notes.txt"),
        named("report", "slides/b.pptx"),
        WorkItem::direct(PathBuf::from("/loose/y.pptx")),
        named("course", "week1/intro.ppt"),
    ];
    let base = Path::new("/out");

    let groups = partition(items.clone(), base);

    let sources: Vec<String> = groups.iter().map(|g| g.source.to_string()).collect();
    assert_eq!(sources, vec!["report", "direct", "course"]);

    let report = &groups[0];
    assert_eq!(report.root, PathBuf::from("/out/report"));
    let dirs: Vec<&Path> = report.dirs.iter().map(|d| d.output_dir.as_path()).collect();
    assert_eq!(
        dirs,
        vec![Path::new("/out/report/slides"), Path::new("/out/report")]
    );
    assert_eq!(
        report.dirs[0].paths(),
        vec![
            PathBuf::from("/in/report/slides/a.pptx"),
            PathBuf::from("/in/report/slides/b.pptx")
        ]
    );

    let direct = &groups[1];
    assert_eq!(direct.root, PathBuf::from("/out"));
    assert_eq!(direct.dirs.len(), 1);
    assert_eq!(direct.dirs[0].output_dir, PathBuf::from("/out"));

    assert_eq!(
        groups[2].dirs[0].output_dir,
        PathBuf::from("/out/course/week1")
    );

    let mut seen: Vec<PathBuf> = groups
        .iter()
        .flat_map(|g| g.dirs.iter().flat_map(|d| d.paths()))
        .collect();
    let mut expected: Vec<PathBuf> = items.into_iter().map(|i| i.path).collect();
    seen.sort();
    expected.sort();
    assert_eq!(seen, expected, "every item lands in exactly one group");
}

#[test]
fn a_directory_named_direct_is_not_a_direct_file() {
    let items = vec![
        WorkItem::direct(PathBuf::from("/loose/x.pptx")),
        named("direct", "y.pptx"),
    ];

    let groups = partition(items, Path::new("/out"));

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].dirs[0].output_dir, PathBuf::from("/out"));
    assert_eq!(groups[1].dirs[0].output_dir, PathBuf::from("/out/direct"));
}

#[tokio::test]
async fn dispatch_builds_one_converter_per_output_directory() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().join("out");
    let factory = RecordingFactory::default();

    let total = dispatch(
        vec![
            named("report", "slides/a.pptx"),
            named("report", "notes.txt"),
            WorkItem::direct(PathBuf::from("/loose/x.pptx")),
        ],
        &base,
        &factory,
    )
    .await;

    assert_eq!(total, 3);
    let batches = factory.batches.lock().unwrap();
    let dirs: Vec<PathBuf> = batches.iter().map(|(dir, _)| dir.clone()).collect();
    assert_eq!(
        dirs,
        vec![
            base.join("report").join("slides"),
            base.join("report"),
            base.clone()
        ]
    );
    assert!(dirs.iter().all(|d| d.is_dir()));
}

#[tokio::test]
async fn dispatch_sums_converter_counts() {
    struct MockFactory;

    impl ConverterFactory for MockFactory {
        fn name(&self) -> &str {
            "mock"
        }

        fn create(&self, _output_dir: &Path) -> Box<dyn Converter> {
            let mut converter = MockConverter::new();
            // Pretend every second file fails.
            converter
                .expect_process()
                .times(1)
                .returning(|paths| paths.len() / 2);
            Box::new(converter)
        }
    }

    let tmp = tempdir().unwrap();
    let items = vec![
        named("a", "one.pptx"),
        named("a", "two.pptx"),
        named("b", "sub/three.pptx"),
        named("b", "sub/four.pptx"),
    ];

    let total = dispatch(items, tmp.path(), &MockFactory).await;

    assert_eq!(total, 2);
}

#[tokio::test]
async fn groups_whose_directory_cannot_be_created_are_skipped() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().to_path_buf();
    // A plain file where a source root is needed.
    std::fs::write(base.join("blocked"), "not a directory").unwrap();
    // A plain file where a nested output directory is needed.
    std::fs::create_dir_all(base.join("partial")).unwrap();
    std::fs::write(base.join("partial").join("sub"), "not a directory").unwrap();
    let factory = RecordingFactory::default();

    let total = dispatch(
        vec![
            named("blocked", "a.pptx"),
            named("partial", "sub/b.pptx"),
            named("partial", "c.pptx"),
            named("fine", "d.pptx"),
        ],
        &base,
        &factory,
    )
    .await;

    assert_eq!(total, 2);
    let batches = factory.batches.lock().unwrap();
    let dirs: Vec<PathBuf> = batches.iter().map(|(dir, _)| dir.clone()).collect();
    assert_eq!(dirs, vec![base.join("partial"), base.join("fine")]);
}
