//! HTTP handlers for the Consultations domain

pub mod consultations;
