pub mod admin;
pub mod apk;
pub mod auth;
pub mod download;
pub mod pages;
pub mod team;
pub mod user;
