//! End-to-end backend runs over descriptor sets built in memory

mod common;

use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use common::*;
use kubeproto_codegen::crd::CrdGenerator;
use kubeproto_codegen::{CodegenError, Target};
use kubeproto_core::descriptor::{FieldBuilder, FileBuilder, MessageBuilder, Scalar};
use kubeproto_core::{GeneratorConfig, wellknown};
use serde_yaml::Value;

// ============================================================================
// Types
// ============================================================================

#[test]
fn test_types_layout() {
    let files = run(Target::Types, &storage_schema());
    assert_eq!(paths(&files), vec!["storage/v1/types.rs"]);

    let types = content(&files, "storage/v1/types.rs");
    assert!(types.starts_with("// Code generated by kubeproto. DO NOT EDIT.\n// Package: storage.v1\n"));
    assert!(types.contains("use std::borrow::Cow;"));
    assert!(types.contains("use std::collections::BTreeMap;"));
    assert!(types.contains("use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;"));
    assert!(types.contains("use kube::core as kubecore;"));
    assert!(types.contains(r#"pub const GROUP_VERSION: &str = "storage.example.dev/v1";"#));
}

#[test]
fn test_types_struct_fields() {
    let files = run(Target::Types, &storage_schema());
    let types = content(&files, "storage/v1/types.rs");

    for line in [
        "pub struct Bucket {",
        "    #[serde(flatten)]\n    pub type_meta: kubecore::TypeMeta,",
        "    #[serde(default)]\n    pub metadata: metav1::ObjectMeta,",
        "    #[serde(default, skip_serializing_if = \"Option::is_none\")]\n    pub status: Option<BucketStatus>,",
        "    #[serde(rename = \"storageClass\", default)]\n    pub storage_class: StorageClass,",
        "    pub quotas: BTreeMap<String, Quota>,",
        "    pub retention: Option<Quota>,",
        "    pub messages: Vec<Grant>,",
        "    pub metadata: metav1::ListMeta,",
        "    pub items: Vec<Bucket>,",
        "    pub last_sync: Option<metav1::Time>,",
        "    pub max_bytes: i64,",
    ] {
        assert!(types.contains(line), "missing:\n{}\n\nin:\n{}", line, types);
    }
}

#[test]
fn test_types_enum_constants() {
    let files = run(Target::Types, &storage_schema());
    let types = content(&files, "storage/v1/types.rs");

    assert!(types.contains("pub struct StorageClass(pub Cow<'static, str>);"));
    assert!(types.contains(r#"pub const STANDARD: Self = Self(Cow::Borrowed("Standard"));"#));
    assert!(types.contains(r#"pub const ARCHIVE: Self = Self(Cow::Borrowed("Archive"));"#));
}

#[test]
fn test_types_object_impls() {
    let files = run(Target::Types, &storage_schema());
    let types = content(&files, "storage/v1/types.rs");

    assert!(types.contains("impl kubeproto_runtime::Object for Bucket {"));
    assert!(types.contains("impl kubeproto_runtime::Object for Tenant {"));
    assert!(types.contains("impl kubeproto_runtime::ObjectList for BucketList {"));
    assert!(types.contains(r#"plural: "buckets","#));
    assert!(types.contains(r#"plural: "tenants","#));
    assert!(types.contains("pub fn add_to_scheme("));
}

#[test]
fn test_types_scope_is_a_rust_bool() {
    let files = run(Target::Types, &storage_schema());
    let types = content(&files, "storage/v1/types.rs");

    let bucket = types.find("impl kubeproto_runtime::Object for Bucket {").unwrap();
    let tenant = types.find("impl kubeproto_runtime::Object for Tenant {").unwrap();
    assert!(types[bucket..tenant].contains("        namespaced: true,\n"));
    assert!(types[tenant..].contains("        namespaced: false,\n"));
    assert!(!types.contains("True"));
    assert!(!types.contains("False"));
}

#[test]
fn test_types_custom_runtime_crate() {
    let config = GeneratorConfig {
        runtime_crate: "crate::runtime".to_string(),
        ..Default::default()
    };
    let files = run_with(Target::Types, &storage_schema(), &config);
    let types = content(&files, "storage/v1/types.rs");

    assert!(types.contains("impl crate::runtime::Object for Bucket {"));
    assert!(!types.contains("kubeproto_runtime"));
}

#[test]
fn test_types_cross_package_reference() {
    let common = FileBuilder::new("common/v1/common.proto", "common.v1").message(
        MessageBuilder::new("Selector").map(
            "match_labels",
            1,
            Scalar::String,
            FieldBuilder::scalar("value", 2, Scalar::String),
        ),
    );
    let apps = FileBuilder::new("apps/v1/app.proto", "apps.v1")
        .dependency("common/v1/common.proto")
        .k8s("example.dev", Some("apps"), "v1")
        .message(
            MessageBuilder::new("App")
                .kind()
                .field(FieldBuilder::message("selector", 2, "common.v1.Selector")),
        );

    let files = run(Target::Types, &schema_of(vec![common, apps]));
    assert_eq!(paths(&files), vec!["apps/v1/types.rs"]);

    let types = content(&files, "apps/v1/types.rs");
    assert!(types.contains("use crate::common::v1::types as v1;"));
    assert!(types.contains("pub selector: v1::Selector,"));
    assert!(!types.contains("pub struct Selector"));
}

#[test]
fn test_types_box_optional_cycle() {
    let file = FileBuilder::new("tree/v1/tree.proto", "tree.v1")
        .k8s("example.dev", Some("tree"), "v1")
        .message(
            MessageBuilder::new("Forest")
                .kind()
                .field(FieldBuilder::message("root", 2, "tree.v1.Node")),
        )
        .message(
            MessageBuilder::new("Node")
                .field(FieldBuilder::scalar("label", 1, Scalar::String))
                .field(FieldBuilder::message("children", 2, "tree.v1.Node").repeated())
                .field(FieldBuilder::message("parent", 3, "tree.v1.Node").optional()),
        );

    let files = run(Target::Types, &schema_of(vec![file]));
    let types = content(&files, "tree/v1/types.rs");

    assert!(types.contains("pub parent: Option<Box<Node>>,"));
    assert!(types.contains("pub children: Vec<Node>,"));
    assert!(types.contains("pub root: Node,"));
}

#[test]
fn test_types_mixed_group_version() {
    let first = FileBuilder::new("storage/v1/bucket.proto", "storage.v1")
        .k8s("example.dev", Some("storage"), "v1")
        .message(MessageBuilder::new("Bucket").kind());
    let second = FileBuilder::new("storage/v1/tenant.proto", "storage.v1")
        .k8s("example.dev", Some("storage"), "v2")
        .message(MessageBuilder::new("Tenant").kind());

    let schema = schema_of(vec![first, second]);
    let err = kubeproto_codegen::generate(Target::Types, &schema, &GeneratorConfig::default())
        .unwrap_err();

    match err {
        CodegenError::MixedGroupVersion { package, .. } => assert_eq!(package, "storage.v1"),
        other => panic!("expected MixedGroupVersion, got {:?}", other),
    }
}

#[test]
fn test_output_is_deterministic() {
    for target in Target::ALL {
        let first = run(target, &storage_schema());
        let second = run(target, &storage_schema());
        assert_eq!(first, second, "{} output differs between runs", target);
    }
}

/// The runtime tests compile a checked-in copy of this output
#[test]
fn test_runtime_fixture_matches_output() {
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("../kubeproto-runtime/tests/fixture");
    let schema = storage_schema();

    for target in [Target::Types, Target::DeepCopy, Target::Client, Target::Fake] {
        let files = run(target, &schema);
        assert_eq!(files.len(), 1, "{} emitted {:?}", target, paths(&files));
        for file in files {
            let path = fixture.join(&file.path);
            let checked_in = fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e));
            assert!(
                checked_in == file.content,
                "{} is stale, regenerate it with `kubeproto {}`\n\nexpected:\n{}",
                path.display(),
                target,
                file.content
            );
        }
    }
}

// ============================================================================
// DeepCopy
// ============================================================================

#[test]
fn test_deepcopy_statements() {
    let files = run(Target::DeepCopy, &storage_schema());
    assert_eq!(paths(&files), vec!["storage/v1/deepcopy.rs"]);

    let deepcopy = content(&files, "storage/v1/deepcopy.rs");
    assert!(deepcopy.contains("use super::types::*;"));
    assert!(deepcopy.contains("use kubeproto_runtime::DeepCopy;"));

    for line in [
        "impl DeepCopy for Bucket {",
        "out.type_meta.clone_from(&self.type_meta);",
        "self.metadata.deep_copy_into(&mut out.metadata);",
        "self.spec.deep_copy_into(&mut out.spec);",
        "out.strings = self.strings.clone();",
        "out.messages = self.messages.iter().map(DeepCopy::deep_copy).collect();",
        "out.storage_class.clone_from(&self.storage_class);",
        "out.replicas = self.replicas;",
        "out.max_bytes = self.max_bytes;",
        "out.items = self.items.iter().map(DeepCopy::deep_copy).collect();",
        "out.owner.clone_from(&self.owner);",
    ] {
        assert!(deepcopy.contains(line), "missing {} in:\n{}", line, deepcopy);
    }
}

// ============================================================================
// CRD
// ============================================================================

fn crd_documents(files: &[kubeproto_codegen::GeneratedFile], path: &str) -> Vec<Value> {
    content(files, path)
        .split("---\n")
        .filter(|doc| !doc.trim().is_empty())
        .map(|doc| serde_yaml::from_str(doc).expect("valid yaml"))
        .collect()
}

fn named<'a>(docs: &'a [Value], name: &str) -> &'a Value {
    docs.iter()
        .find(|d| d["metadata"]["name"].as_str() == Some(name))
        .unwrap_or_else(|| panic!("no CRD named {}", name))
}

#[test]
fn test_crd_stream() {
    let files = run(Target::Crd, &storage_schema());
    assert_eq!(paths(&files), vec!["crds.yaml"]);

    let docs = crd_documents(&files, "crds.yaml");
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["metadata"]["name"].as_str(), Some("buckets.storage.example.dev"));
    assert_eq!(docs[1]["metadata"]["name"].as_str(), Some("tenants.storage.example.dev"));

    let bucket = named(&docs, "buckets.storage.example.dev");
    assert_eq!(bucket["apiVersion"].as_str(), Some("apiextensions.k8s.io/v1"));
    assert_eq!(bucket["kind"].as_str(), Some("CustomResourceDefinition"));
    assert_eq!(bucket["spec"]["group"].as_str(), Some("storage.example.dev"));
    assert_eq!(bucket["spec"]["scope"].as_str(), Some("Namespaced"));
    assert_eq!(bucket["spec"]["names"]["kind"].as_str(), Some("Bucket"));
    assert_eq!(bucket["spec"]["names"]["listKind"].as_str(), Some("BucketList"));
    assert_eq!(bucket["spec"]["names"]["plural"].as_str(), Some("buckets"));
    assert_eq!(bucket["spec"]["names"]["singular"].as_str(), Some("bucket"));

    let tenant = named(&docs, "tenants.storage.example.dev");
    assert_eq!(tenant["spec"]["scope"].as_str(), Some("Cluster"));
}

#[test]
fn test_crd_schema_properties() {
    let files = run(Target::Crd, &storage_schema());
    let docs = crd_documents(&files, "crds.yaml");
    let version = &named(&docs, "buckets.storage.example.dev")["spec"]["versions"][0];

    assert_eq!(version["name"].as_str(), Some("v1"));
    assert_eq!(version["served"].as_bool(), Some(true));
    assert_eq!(version["storage"].as_bool(), Some(true));
    assert!(version["subresources"]["status"].is_mapping());
    assert!(version["subresources"]["scale"].is_null());

    let root = &version["schema"]["openAPIV3Schema"];
    assert_eq!(root["type"].as_str(), Some("object"));
    assert_eq!(root["properties"]["apiVersion"]["type"].as_str(), Some("string"));
    assert_eq!(root["properties"]["kind"]["type"].as_str(), Some("string"));
    assert_eq!(root["properties"]["metadata"]["type"].as_str(), Some("object"));

    let spec = &root["properties"]["spec"]["properties"];
    assert_eq!(spec["strings"]["type"].as_str(), Some("array"));
    assert_eq!(spec["strings"]["items"]["type"].as_str(), Some("string"));
    assert_eq!(spec["messages"]["items"]["properties"]["verbs"]["type"].as_str(), Some("array"));
    assert_eq!(spec["replicas"]["type"].as_str(), Some("integer"));
    assert_eq!(spec["replicas"]["format"].as_str(), Some("int32"));

    let class = &spec["storageClass"];
    assert_eq!(class["type"].as_str(), Some("string"));
    let symbols: Vec<&str> = class["enum"]
        .as_sequence()
        .expect("enum values")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(symbols, vec!["Standard", "Archive"]);

    let quotas = &spec["quotas"];
    assert_eq!(quotas["type"].as_str(), Some("object"));
    assert_eq!(
        quotas["additionalProperties"]["properties"]["maxBytes"]["format"].as_str(),
        Some("int64")
    );

    let status = &root["properties"]["status"]["properties"];
    assert_eq!(status["lastSync"]["type"].as_str(), Some("string"));
    assert_eq!(status["lastSync"]["format"].as_str(), Some("date-time"));
}

#[test]
fn test_crd_storage_version_prefers_stable() {
    let schema = schema_of(vec![
        storage_file("storage.v1beta1", "v1beta1"),
        storage_file("storage.v1", "v1"),
        storage_file("storage.v1alpha1", "v1alpha1"),
    ]);
    let files = run(Target::Crd, &schema);
    let docs = crd_documents(&files, "crds.yaml");
    assert_eq!(docs.len(), 2);

    let versions = named(&docs, "buckets.storage.example.dev")["spec"]["versions"]
        .as_sequence()
        .expect("versions")
        .clone();
    let names: Vec<&str> = versions.iter().filter_map(|v| v["name"].as_str()).collect();
    assert_eq!(names, vec!["v1", "v1alpha1", "v1beta1"]);

    let storage: Vec<&str> = versions
        .iter()
        .filter(|v| v["storage"].as_bool() == Some(true))
        .filter_map(|v| v["name"].as_str())
        .collect();
    assert_eq!(storage, vec!["v1"]);

    let definitions = CrdGenerator::new(&GeneratorConfig::default())
        .definitions(&schema)
        .unwrap();
    for crd in &definitions {
        let version = crd.spec.storage_version().map(|v| v.name.as_str());
        assert_eq!(version, Some("v1"), "{}", crd.name());
    }
}

/// Collects formatted events written by a test subscriber
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with WARN and above captured
fn with_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    (result, logs)
}

#[test]
fn test_crd_warns_on_dropped_annotations() {
    let file = FileBuilder::new("shop/v1/widget.proto", "shop.v1")
        .k8s("example.dev", Some("shop"), "v1")
        .message(
            MessageBuilder::new("Widget")
                .kind()
                .field(FieldBuilder::message("health", 2, "shop.v1.Health").sub_resource())
                .field(FieldBuilder::message("paging", 3, wellknown::LIST_META).inline()),
        )
        .message(MessageBuilder::new("Health").field(FieldBuilder::scalar("ok", 1, Scalar::Bool)));
    let schema = schema_of(vec![file]);

    let (files, logs) = with_warnings(|| run(Target::Crd, &schema));

    let docs = crd_documents(&files, "crds.yaml");
    let version = &named(&docs, "widgets.shop.example.dev")["spec"]["versions"][0];
    assert!(version["subresources"].is_null());
    let properties = &version["schema"]["openAPIV3Schema"]["properties"];
    assert!(properties["health"].is_mapping());
    assert!(properties["paging"].is_null());
    assert!(properties["continue"].is_null());

    assert!(logs.contains("WARN"), "logs: {}", logs);
    assert!(logs.contains("neither status nor scale"), "logs: {}", logs);
    assert!(logs.contains("health"), "logs: {}", logs);
    assert!(logs.contains("inline field not expanded"), "logs: {}", logs);
    assert!(logs.contains("paging"), "logs: {}", logs);
}

#[test]
fn test_crd_conflicting_scope() {
    let namespaced = FileBuilder::new("storage/v1/tenant.proto", "storage.v1")
        .k8s("example.dev", Some("storage"), "v1")
        .message(MessageBuilder::new("Tenant").kind());
    let cluster = FileBuilder::new("storage/v2/tenant.proto", "storage.v2")
        .k8s("example.dev", Some("storage"), "v2")
        .message(MessageBuilder::new("Tenant").kind().cluster_scoped());

    let schema = schema_of(vec![namespaced, cluster]);
    let err = kubeproto_codegen::generate(Target::Crd, &schema, &GeneratorConfig::default())
        .unwrap_err();

    match err {
        CodegenError::ConflictingScope { group, kind, .. } => {
            assert_eq!(group, "storage.example.dev");
            assert_eq!(kind, "Tenant");
        }
        other => panic!("expected ConflictingScope, got {:?}", other),
    }
}

#[test]
fn test_crd_split_with_categories() {
    let mut config = GeneratorConfig::default();
    config.crd.split = true;
    config.crd.categories = vec!["storage".to_string()];

    let files = run_with(Target::Crd, &storage_schema(), &config);
    assert_eq!(
        paths(&files),
        vec!["buckets.storage.example.dev.yaml", "tenants.storage.example.dev.yaml"]
    );

    let docs = crd_documents(&files, "tenants.storage.example.dev.yaml");
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["spec"]["names"]["categories"][0].as_str(), Some("storage"));
}

#[test]
fn test_crd_cycle_is_opaque() {
    let file = FileBuilder::new("tree/v1/tree.proto", "tree.v1")
        .k8s("example.dev", Some("tree"), "v1")
        .message(
            MessageBuilder::new("Forest")
                .kind()
                .field(FieldBuilder::message("root", 2, "tree.v1.Node")),
        )
        .message(
            MessageBuilder::new("Node")
                .field(FieldBuilder::scalar("label", 1, Scalar::String))
                .field(FieldBuilder::message("children", 2, "tree.v1.Node").repeated()),
        );

    let files = run(Target::Crd, &schema_of(vec![file]));
    let docs = crd_documents(&files, "crds.yaml");
    let root = &docs[0]["spec"]["versions"][0]["schema"]["openAPIV3Schema"];
    let children = &root["properties"]["root"]["properties"]["children"];

    assert_eq!(children["type"].as_str(), Some("array"));
    assert_eq!(children["items"]["type"].as_str(), Some("object"));
    assert_eq!(
        children["items"]["x-kubernetes-preserve-unknown-fields"].as_bool(),
        Some(true)
    );
}

#[test]
fn test_crd_without_kinds_is_empty() {
    let file = FileBuilder::new("common/v1/common.proto", "common.v1")
        .message(MessageBuilder::new("Selector").field(FieldBuilder::scalar("name", 1, Scalar::String)));
    assert!(run(Target::Crd, &schema_of(vec![file])).is_empty());
}

// ============================================================================
// Client and fake
// ============================================================================

#[test]
fn test_client_methods() {
    let files = run(Target::Client, &storage_schema());
    assert_eq!(paths(&files), vec!["storage/v1/client.rs"]);

    let client = content(&files, "storage/v1/client.rs");
    for line in [
        "pub struct StorageV1Client<B: kubeproto_runtime::Backend> {",
        "pub async fn get_bucket(&self, namespace: &str, name: &str) -> kubeproto_runtime::Result<Bucket> {",
        "pub async fn list_buckets(",
        "pub async fn watch_buckets(",
        "pub async fn get_tenant(&self, name: &str) -> kubeproto_runtime::Result<Tenant> {",
        "pub async fn delete_tenant(&self, name: &str) -> kubeproto_runtime::Result<()> {",
        "impl StorageV1Client<kubeproto_runtime::RestBackend> {",
        "pub struct BucketInformer {",
        "pub struct TenantLister {",
    ] {
        assert!(client.contains(line), "missing {} in:\n{}", line, client);
    }
    assert_eq!(client.matches("pub fn list_namespace(").count(), 1);
}

#[test]
fn test_fake_seeding() {
    let files = run(Target::Fake, &storage_schema());
    assert_eq!(paths(&files), vec!["storage/v1/fake.rs"]);

    let fake = content(&files, "storage/v1/fake.rs");
    for line in [
        "pub type FakeStorageV1Client = StorageV1Client<kubeproto_runtime::FakeBackend>;",
        "pub enum StorageV1Object {",
        "impl From<Bucket> for StorageV1Object {",
        "pub fn new_fake_storage_v1_client(",
        "StorageV1Object::Tenant(o) => client.seed_tenant(o)?,",
        "pub fn seed_bucket(&self, object: Bucket) -> kubeproto_runtime::Result<()> {",
    ] {
        assert!(fake.contains(line), "missing {} in:\n{}", line, fake);
    }
}

#[test]
fn test_client_skips_packages_without_kinds() {
    let file = FileBuilder::new("common/v1/common.proto", "common.v1")
        .message(MessageBuilder::new("Selector").field(FieldBuilder::scalar("name", 1, Scalar::String)));
    let schema = schema_of(vec![file]);

    assert!(run(Target::Client, &schema).is_empty());
    assert!(run(Target::Fake, &schema).is_empty());
}
