//! Fake-Client backend
//!
//! The same client type as the Client/Informer backend, instantiated over
//! the runtime `FakeBackend`, plus a seeding constructor and per-Kind seed
//! helpers.

use kubeproto_core::{GeneratorConfig, Schema};

use crate::client::render_units;
use crate::engine::TemplateEngine;
use crate::error::Result;
use crate::generator::{GeneratedFile, Generator, Target};

pub const FAKE_FILE: &str = "fake.rs";

pub struct FakeGenerator {
    runtime: String,
    engine: TemplateEngine,
}

impl FakeGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            runtime: config.runtime_crate.clone(),
            engine: TemplateEngine::new(),
        }
    }
}

impl Generator for FakeGenerator {
    fn target(&self) -> Target {
        Target::Fake
    }

    fn generate(&self, schema: &Schema) -> Result<Vec<GeneratedFile>> {
        render_units(&self.engine, schema, &self.runtime, "fake.rs.jinja", FAKE_FILE)
    }
}
