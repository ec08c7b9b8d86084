//! Descriptor sets shared by the backend tests

#![allow(dead_code)]

use std::collections::BTreeMap;

use kubeproto_codegen::{GeneratedFile, Target};
use kubeproto_core::descriptor::{
    EnumBuilder, FieldBuilder, FileBuilder, MessageBuilder, Scalar, descriptor_set,
};
use kubeproto_core::{GeneratorConfig, Schema, build_schema, wellknown};

pub const STORAGE_FILE: &str = "storage/v1/bucket.proto";

/// `storage.example.dev/v1`: a namespaced Bucket and a cluster-scoped Tenant
pub fn storage_file(package: &str, version: &str) -> FileBuilder {
    let ty = |name: &str| format!("{}.{}", package, name);
    FileBuilder::new(&format!("storage/{}/bucket.proto", version), package)
        .k8s("example.dev", Some("storage"), version)
        .message(
            MessageBuilder::new("Bucket")
                .kind()
                .field(FieldBuilder::message("spec", 2, &ty("BucketSpec")))
                .field(
                    FieldBuilder::message("status", 3, &ty("BucketStatus"))
                        .optional()
                        .sub_resource(),
                ),
        )
        .message(
            MessageBuilder::new("BucketSpec")
                .field(FieldBuilder::scalar("strings", 1, Scalar::String).repeated())
                .field(FieldBuilder::message("messages", 2, &ty("Grant")).repeated())
                .field(FieldBuilder::enumeration("storage_class", 3, &ty("StorageClass")))
                .map("quotas", 4, Scalar::String, FieldBuilder::message("value", 2, &ty("Quota")))
                .field(FieldBuilder::message("retention", 5, &ty("Quota")).optional())
                .field(FieldBuilder::scalar("replicas", 6, Scalar::Int32)),
        )
        .message(
            MessageBuilder::new("Grant")
                .field(FieldBuilder::scalar("name", 1, Scalar::String))
                .field(FieldBuilder::scalar("verbs", 2, Scalar::String).repeated()),
        )
        .message(MessageBuilder::new("Quota").field(FieldBuilder::scalar("max_bytes", 1, Scalar::Int64)))
        .message(
            MessageBuilder::new("BucketStatus")
                .field(FieldBuilder::scalar("ready_replicas", 1, Scalar::Int32))
                .field(FieldBuilder::message("last_sync", 2, wellknown::TIME)),
        )
        .message(
            MessageBuilder::new("Tenant")
                .kind()
                .cluster_scoped()
                .field(FieldBuilder::scalar("owner", 2, Scalar::String)),
        )
        .enumeration(
            EnumBuilder::new("StorageClass")
                .value("STORAGE_CLASS_STANDARD", 0)
                .value("STORAGE_CLASS_ARCHIVE", 1),
        )
}

pub fn schema_of(files: Vec<FileBuilder>) -> Schema {
    let set = descriptor_set(files.into_iter().map(FileBuilder::build));
    build_schema(&set, &[], &BTreeMap::new()).expect("schema builds")
}

pub fn storage_schema() -> Schema {
    schema_of(vec![storage_file("storage.v1", "v1")])
}

pub fn run(target: Target, schema: &Schema) -> Vec<GeneratedFile> {
    run_with(target, schema, &GeneratorConfig::default())
}

pub fn run_with(target: Target, schema: &Schema, config: &GeneratorConfig) -> Vec<GeneratedFile> {
    kubeproto_codegen::generate(target, schema, config).expect("generation succeeds")
}

/// Content of the single file at `path`
pub fn content<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path.to_string_lossy() == path)
        .map(|f| f.content.as_str())
        .unwrap_or_else(|| {
            let paths: Vec<_> = files.iter().map(|f| f.path.display().to_string()).collect();
            panic!("no file {} in {:?}", path, paths)
        })
}

pub fn paths(files: &[GeneratedFile]) -> Vec<String> {
    files.iter().map(|f| f.path.to_string_lossy().into_owned()).collect()
}
