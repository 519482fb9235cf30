// Test modules for ai-helper crate
//
// Each source area has a corresponding test file that focuses on business
// logic verification. HTTP collaborators are covered by the integration
// tests under tests/ against wiremock servers.

// Shared fixtures (scripted adapter, sample tools and schemas)
pub mod helpers;

pub mod conversion;
