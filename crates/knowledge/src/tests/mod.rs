//! Pipeline-level tests for answer orchestration.

mod support;
