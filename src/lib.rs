pub mod artwork_set;
pub mod config;
pub mod error;
pub mod events;
pub mod lightbox;
pub mod page;
pub mod schedule;
pub mod slideshow;
pub mod view;
pub mod web;
pub mod tasks {
    pub mod catalog;
    pub mod gallery;
}
