//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up from a
//! loaded configuration. This is the dependency injection point for the
//! application.

use crate::application::{Collaborators, GenerateOptions, GenerateUseCase, PlanUseCase};
use crate::config::Config;
use crate::domain::value_objects::PathRules;
use crate::error::{MocksmithError, MocksmithResult};
use crate::infrastructure::{
    FetchBindingGenerator, FsMockupScanner, HtmlMockupParser, JsonLedgerRepository, LocalFs,
    TsxEmitter,
};

/// Type alias for the concrete PlanUseCase with all dependencies
pub type ConcretePlanUseCase = PlanUseCase<JsonLedgerRepository, LocalFs>;

/// Type alias for the concrete GenerateUseCase with all dependencies
pub type ConcreteGenerateUseCase = GenerateUseCase<JsonLedgerRepository, LocalFs>;

/// Scanner over the configured mockup root
pub fn create_scanner(config: &Config) -> MocksmithResult<FsMockupScanner> {
    let root = config.mockup_root();
    let rules = PathRules::load(&root, &config.scan.include, &config.scan.skip).map_err(|e| {
        MocksmithError::Config {
            file: config.base_dir.clone(),
            message: e.to_string(),
        }
    })?;
    Ok(FsMockupScanner::new(
        root,
        rules,
        config.scan.composition.clone(),
        config.scan.variant_suffixes.clone(),
    ))
}

/// The default parser, emitter and binding generator
pub fn create_collaborators(config: &Config) -> MocksmithResult<Collaborators> {
    Ok(Collaborators {
        source: Box::new(create_scanner(config)?),
        parser: Box::new(HtmlMockupParser::new(config.mockup_root())),
        emitter: Box::new(TsxEmitter::new()),
        bindings: Box::new(FetchBindingGenerator::new(config.api.base_url_env.clone())),
    })
}

pub fn create_ledger(config: &Config) -> JsonLedgerRepository {
    JsonLedgerRepository::new(config.state_dir())
}

/// Create a plan use case with all dependencies wired up
pub fn create_plan_use_case(config: &Config) -> MocksmithResult<ConcretePlanUseCase> {
    Ok(PlanUseCase::new(
        create_ledger(config),
        LocalFs::new(),
        Box::new(create_scanner(config)?),
    ))
}

/// Create a generate use case with all dependencies wired up
pub fn create_generate_use_case(config: &Config) -> MocksmithResult<ConcreteGenerateUseCase> {
    Ok(GenerateUseCase::new(
        create_ledger(config),
        LocalFs::new(),
        create_collaborators(config)?,
    ))
}

/// Options for a generate run, before CLI-only settings are layered on
pub fn generate_options(config: &Config) -> GenerateOptions {
    GenerateOptions::new(config.output_root(), config.state_dir())
        .with_layout(config.outputs.clone())
}
