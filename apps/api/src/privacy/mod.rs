// PII Masker
// Best-effort privacy reduction applied to resume text before it leaves the
// service for the hosted completion API.

pub mod masker;
pub mod tagger;

pub use masker::PiiMasker;
