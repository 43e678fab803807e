// demos/onboarding/src/workflows/mod.rs

pub mod onboarding;

use crate::config::AppConfig;
use crate::services::UserDirectory;
use onboarding::{AddUserToGroupsStep, CreateUserStep, DeleteUserStep, OnboardingWorkflow};
use sagaflow::StepRegistry;

/// Registers every step, compensation and definition the demo uses.
pub fn register_all(registry: &StepRegistry) {
  registry
    .register_step(|scope| {
      Ok(CreateUserStep {
        directory: scope.get::<UserDirectory>()?,
        config: scope.get::<AppConfig>()?,
      })
    })
    .register_step(|scope| {
      Ok(AddUserToGroupsStep {
        directory: scope.get::<UserDirectory>()?,
        config: scope.get::<AppConfig>()?,
      })
    })
    .register_compensation(|scope| {
      Ok(DeleteUserStep {
        directory: scope.get::<UserDirectory>()?,
      })
    })
    .register_definition_default::<OnboardingWorkflow>();
}
