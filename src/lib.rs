//! fieldscan: field-survey OCR scanning, review dashboards and AI-assisted
//! survey design.
//!
//! | Module | Role |
//! |--------|------|
//! | [`capture`] | file / drop / camera input → image payloads and previews |
//! | [`ocr`] | recognition engines and the invoker that drives them |
//! | [`ledger`] | history of recognition jobs and their export |
//! | [`pipeline`] | the scanner task tying the three together |
//! | [`records`] | review, validation and agent records with filters |
//! | [`survey`] | question model, generator client and builder |
//! | [`config`] | `settings.toml` and platform paths |
//! | [`app`] | the egui dashboard |

pub mod app;
pub mod capture;
pub mod config;
pub mod ledger;
pub mod ocr;
pub mod pipeline;
pub mod records;
pub mod survey;
