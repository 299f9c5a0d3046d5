use std::path::{Path, PathBuf};
use std::sync::Arc;

use lopdf::{dictionary, Object, Stream};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

use ectd_core::checksum::{digest_bytes, ChecksumAlgorithm};
use ectd_core::models::{
    AuditEventType, Document, EntryOutcome, Operation, PlannedDocumentEntry, SequenceNumber, SkipReason,
};
use ectd_db::MemorySubmissionStore;
use ectd_service::{BuildOptions, EctdService};

struct Fixture {
    _dir: TempDir,
    export_root: PathBuf,
    source_root: PathBuf,
    store: Arc<MemorySubmissionStore>,
    service: EctdService,
}

impl Fixture {
    fn new() -> Self {
        Self::with_options(|_| {})
    }

    fn with_options(configure: impl FnOnce(&mut BuildOptions)) -> Self {
        let dir = TempDir::new().unwrap();
        let export_root = dir.path().join("exports");
        let source_root = dir.path().join("sources");
        std::fs::create_dir_all(&source_root).unwrap();

        let store = Arc::new(MemorySubmissionStore::new());
        let mut options = BuildOptions {
            export_root: export_root.clone(),
            document_root: source_root.clone(),
            ..BuildOptions::default()
        };
        configure(&mut options);
        let service = EctdService::new(store.clone(), options);

        Self {
            _dir: dir,
            export_root,
            source_root,
            store,
            service,
        }
    }

    async fn add_document(&self, title: &str, version: &str, contents: &[u8]) -> Document {
        let file_name = format!("{}.bin", Uuid::new_v4());
        std::fs::write(self.source_root.join(&file_name), contents).unwrap();
        self.register(title, version, file_name).await
    }

    async fn register(&self, title: &str, version: &str, file_name: String) -> Document {
        let doc = Document {
            id: Uuid::new_v4(),
            file_path: file_name,
            title: title.to_string(),
            version: version.to_string(),
            metadata: json!({}),
            last_submitted_version: None,
        };
        self.store.insert_document(doc.clone()).await;
        doc
    }

    fn sequence_dir(&self, sequence: &str) -> PathBuf {
        self.export_root.join(sequence)
    }

    /// Anything left in the export root besides published sequences.
    fn leftovers(&self) -> Vec<String> {
        match std::fs::read_dir(&self.export_root) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn seq(s: &str) -> SequenceNumber {
    s.parse().unwrap()
}

fn leaf_hrefs(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut hrefs = Vec::new();
    loop {
        match reader.read_event().expect("well-formed xml") {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"leaf" => {
                let attr = e.try_get_attribute("xlink:href").unwrap().expect("leaf without href");
                hrefs.push(attr.unescape_value().unwrap().into_owned());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    hrefs
}

/// One-page PDF, optionally with a JavaScript open action.
fn write_pdf(path: &Path, with_javascript: bool) {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if with_javascript {
        let action_id = doc.add_object(dictionary! {
            "S" => "JavaScript",
            "JS" => Object::string_literal("app.alert('hi')"),
        });
        catalog.set("OpenAction", action_id);
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn first_sequence_lists_every_document_once() {
    let fx = Fixture::new();
    let cover = fx.add_document("Cover Letter", "1", b"cover").await;
    let qos = fx.add_document("Quality Overall Summary", "3", b"qos").await;
    let plan = vec![
        PlannedDocumentEntry::new(cover.id, "m1/us", Operation::New),
        PlannedDocumentEntry::new(qos.id, "m2/23-qos", Operation::New),
    ];

    let summary = fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap();

    assert_eq!(summary.sequence.to_string(), "0000");
    assert_eq!(summary.document_count, 2);
    assert!(summary.entries.iter().all(EntryOutcome::is_included));

    let root = fx.sequence_dir("0000");
    assert!(root.join("m1/us/CoverLetter-v1.pdf").is_file());
    assert!(root.join("m2/23-qos/QualityOverallSummary-v3.pdf").is_file());
    assert!(root.join("util/dtd").is_dir());

    let index = read(&root.join("index.xml"));
    let hrefs = leaf_hrefs(&index);
    let included_events = fx
        .store
        .audit_trail()
        .await
        .into_iter()
        .filter(|e| e.event_type == AuditEventType::DocumentIncluded)
        .count();
    assert_eq!(hrefs.len(), included_events);
    for expected in ["m1/us/CoverLetter-v1.pdf", "m2/23-qos/QualityOverallSummary-v3.pdf"] {
        assert_eq!(hrefs.iter().filter(|h| *h == expected).count(), 1);
    }

    let manifest = read(&root.join("index-md5.txt"));
    assert_eq!(manifest, digest_bytes(ChecksumAlgorithm::Md5, index.as_bytes()));

    assert_eq!(fx.store.sequences().await.len(), 1);
    assert_eq!(
        fx.store.document(cover.id).await.unwrap().last_submitted_version.as_deref(),
        Some("1")
    );
    assert!(fx.leftovers().iter().all(|name| !name.starts_with(".staging")));
}

#[tokio::test]
async fn regional_backbone_holds_module_one_only() {
    let fx = Fixture::new();
    let form = fx.add_document("Form 1571", "1", b"form").await;
    let study = fx.add_document("Study Report", "1", b"csr").await;
    let plan = vec![
        PlannedDocumentEntry::new(form.id, "m1/us", Operation::New),
        PlannedDocumentEntry::new(study.id, "m5/53-clin-stud-rep", Operation::New),
    ];

    fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap();

    let regional_path = fx.sequence_dir("0000").join("m1/us/us-regional.xml");
    let hrefs = leaf_hrefs(&read(&regional_path));
    assert_eq!(hrefs, vec!["Form1571-v1.pdf".to_string()]);

    let regional_dir = regional_path.parent().unwrap();
    for href in &hrefs {
        assert!(regional_dir.join(href).is_file(), "{href} does not resolve from m1/us");
    }
}

#[tokio::test]
async fn regional_backbone_without_module_one_is_empty_but_valid() {
    let fx = Fixture::new();
    let study = fx.add_document("Study Report", "1", b"csr").await;
    let plan = vec![PlannedDocumentEntry::new(study.id, "m5/53-clin-stud-rep", Operation::New)];

    fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap();

    let regional = read(&fx.sequence_dir("0000").join("m1/us/us-regional.xml"));
    assert!(leaf_hrefs(&regional).is_empty());
    assert!(regional.contains("<sequence-number>0000</sequence-number>"));
}

#[tokio::test]
async fn errored_entries_are_not_copied_or_audited() {
    let fx = Fixture::new();
    let good = fx.add_document("Cover Letter", "1", b"cover").await;
    let bad = fx.add_document("Rejected Memo", "1", b"memo").await;
    let mut flagged = PlannedDocumentEntry::new(bad.id, "m1/us", Operation::New);
    flagged.errors = Some(vec![json!({ "code": "PLAN-003" })]);
    let plan = vec![PlannedDocumentEntry::new(good.id, "m1/us", Operation::New), flagged];

    let summary = fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap();

    assert_eq!(summary.document_count, 1);
    assert_eq!(
        summary.entries[1],
        EntryOutcome::Skipped {
            document_id: bad.id,
            reason: SkipReason::ValidationErrors
        }
    );
    assert!(!fx.sequence_dir("0000").join("m1/us/RejectedMemo-v1.pdf").exists());
    let audit = fx.store.audit_trail().await;
    assert!(audit
        .iter()
        .all(|e| e.details.get("documentId") != Some(&json!(bad.id.to_string()))));
    assert_eq!(fx.store.document(bad.id).await.unwrap().last_submitted_version, None);
}

#[tokio::test]
async fn missing_document_is_skipped_with_reason() {
    let fx = Fixture::new();
    let ghost = Uuid::new_v4();
    let plan = vec![PlannedDocumentEntry::new(ghost, "m1/us", Operation::New)];

    let summary = fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap();

    assert_eq!(summary.document_count, 0);
    assert_eq!(
        summary.entries,
        vec![EntryOutcome::Skipped {
            document_id: ghost,
            reason: SkipReason::DocumentNotFound
        }]
    );
    let created: Vec<_> = fx
        .store
        .audit_trail()
        .await
        .into_iter()
        .filter(|e| e.event_type == AuditEventType::SequenceCreated)
        .collect();
    assert_eq!(created.len(), 1);
}

#[tokio::test]
async fn traversal_module_path_is_skipped() {
    let fx = Fixture::new();
    let doc = fx.add_document("Escape", "1", b"x").await;
    let plan = vec![PlannedDocumentEntry::new(doc.id, "../outside", Operation::New)];

    let summary = fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap();

    assert_eq!(
        summary.entries,
        vec![EntryOutcome::Skipped {
            document_id: doc.id,
            reason: SkipReason::InvalidModulePath
        }]
    );
    assert!(!fx.export_root.join("outside").exists());
}

#[tokio::test]
async fn colliding_file_names_keep_the_first_entry() {
    let fx = Fixture::new();
    let first = fx.add_document("Cover Letter", "1", b"one").await;
    let second = fx.add_document("Cover Letter!", "1", b"two").await;
    let plan = vec![
        PlannedDocumentEntry::new(first.id, "m1/us", Operation::New),
        PlannedDocumentEntry::new(second.id, "m1/us", Operation::New),
    ];

    let summary = fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap();

    assert_eq!(summary.document_count, 1);
    assert!(matches!(
        summary.entries[1],
        EntryOutcome::Skipped { reason: SkipReason::DuplicateTarget, .. }
    ));
    assert_eq!(std::fs::read(fx.sequence_dir("0000").join("m1/us/CoverLetter-v1.pdf")).unwrap(), b"one");
}

#[tokio::test]
async fn follow_up_sequence_increments_base() {
    let fx = Fixture::new();
    let doc = fx.add_document("Cover Letter", "1", b"cover").await;
    let plan = vec![PlannedDocumentEntry::new(doc.id, "m1/us", Operation::New)];
    fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap();

    let replace = vec![PlannedDocumentEntry::new(doc.id, "m1/us", Operation::Replace)];
    let summary = fx.service.build_sequence(seq("0000"), &replace, "bob").await.unwrap();

    assert_eq!(summary.sequence.to_string(), "0001");
    assert_eq!(fx.service.last_sequence().await.unwrap().to_string(), "0001");
    let index = read(&fx.sequence_dir("0001").join("index.xml"));
    assert!(index.contains(r#"operation="replace""#));
}

#[tokio::test]
async fn stale_base_conflicts_and_leaves_nothing_behind() {
    let fx = Fixture::new();
    let doc = fx.add_document("Cover Letter", "1", b"cover").await;
    let plan = vec![PlannedDocumentEntry::new(doc.id, "m1/us", Operation::New)];
    fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap();
    fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap();

    let err = fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap_err();

    assert!(err.is_conflict(), "unexpected error: {err}");
    assert!(!fx.sequence_dir("0002").exists());
    assert_eq!(fx.store.sequences().await.len(), 2);
    assert!(fx.leftovers().iter().all(|name| !name.starts_with(".staging")));
}

#[tokio::test]
async fn store_failure_rolls_back_the_build() {
    let fx = Fixture::new();
    let doc = fx.add_document("Cover Letter", "1", b"cover").await;
    let plan = vec![PlannedDocumentEntry::new(doc.id, "m1/us", Operation::New)];
    fx.store.fail_writes(true);

    let result = fx.service.build_sequence(seq("0000"), &plan, "alice").await;

    assert!(result.is_err());
    assert!(fx.leftovers().is_empty(), "left behind: {:?}", fx.leftovers());
    assert!(fx.store.sequences().await.is_empty());
    assert!(fx.store.audit_trail().await.is_empty());
}

#[tokio::test]
async fn existing_target_directory_is_refused() {
    let fx = Fixture::new();
    std::fs::create_dir_all(fx.sequence_dir("0000")).unwrap();

    let err = fx.service.build_sequence(seq("0000"), &[], "alice").await.unwrap_err();

    assert!(matches!(err, ectd_service::Error::TargetExists { .. }));
    assert!(fx.store.sequences().await.is_empty());
}

#[tokio::test]
async fn identical_sources_hash_identically() {
    let fx = Fixture::new();
    let a = fx.add_document("Copy A", "1", b"same bytes").await;
    let b = fx.add_document("Copy B", "1", b"same bytes").await;
    let plan = vec![
        PlannedDocumentEntry::new(a.id, "m3/32-body-data", Operation::New),
        PlannedDocumentEntry::new(b.id, "m3/32-body-data", Operation::New),
    ];

    let summary = fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap();

    let checksums: Vec<&str> = summary
        .entries
        .iter()
        .filter_map(|e| match e {
            EntryOutcome::Included { checksum, .. } => Some(checksum.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(checksums.len(), 2);
    assert_eq!(checksums[0], checksums[1]);
    assert_eq!(checksums[0], digest_bytes(ChecksumAlgorithm::Md5, b"same bytes"));
}

#[tokio::test]
async fn scripted_pdf_aborts_build_when_screening() {
    let fx = Fixture::with_options(|options| options.pdf_checks = true);
    let clean_name = "clean.pdf".to_string();
    let scripted_name = "scripted.pdf".to_string();
    write_pdf(&fx.source_root.join(&clean_name), false);
    write_pdf(&fx.source_root.join(&scripted_name), true);
    let clean = fx.register("Cover Letter", "1", clean_name).await;
    let scripted = fx.register("Investigator Brochure", "1", scripted_name).await;
    let plan = vec![
        PlannedDocumentEntry::new(clean.id, "m1/us", Operation::New),
        PlannedDocumentEntry::new(scripted.id, "m1/us", Operation::New),
    ];

    let err = fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap_err();

    match err {
        ectd_service::Error::PdfRejected { document_id, message } => {
            assert_eq!(document_id, scripted.id);
            assert!(message.contains("JavaScript"), "{message}");
        }
        other => panic!("expected PdfRejected, got {other}"),
    }
    assert!(fx.leftovers().is_empty(), "left behind: {:?}", fx.leftovers());
    assert!(fx.store.sequences().await.is_empty());
    assert!(fx.store.audit_trail().await.is_empty());
}

#[tokio::test]
async fn sha256_builds_write_a_sha256_manifest() {
    let fx = Fixture::with_options(|options| options.checksum = ChecksumAlgorithm::Sha256);
    let doc = fx.add_document("Cover Letter", "1", b"cover").await;
    let plan = vec![PlannedDocumentEntry::new(doc.id, "m1/us", Operation::New)];

    let summary = fx.service.build_sequence(seq("0000"), &plan, "alice").await.unwrap();

    let root = fx.sequence_dir("0000");
    let index = read(&root.join("index.xml"));
    assert!(!root.join("index-md5.txt").exists());
    assert_eq!(
        read(&root.join("index-sha256.txt")),
        digest_bytes(ChecksumAlgorithm::Sha256, index.as_bytes())
    );
    assert!(index.contains(r#"checksum-type="sha256""#));
    assert!(matches!(
        &summary.entries[0],
        EntryOutcome::Included { checksum, .. } if *checksum == digest_bytes(ChecksumAlgorithm::Sha256, b"cover")
    ));
}
