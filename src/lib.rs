//! Likes Counter library.
//!
//! A small web service that signs a user in to Twitter with OAuth 1.0a,
//! walks their recent likes and ranks the accounts they like most.

pub mod auth;
pub mod components;
pub mod config;
pub mod constants;
pub mod likes;
pub mod oauth;
pub mod twitter;
pub mod web;
