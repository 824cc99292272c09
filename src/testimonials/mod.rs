//! Video testimonials — records owned by a remote content service.

pub mod client;
pub mod gallery;
pub mod model;
pub mod routes;

pub use client::{ContentClient, TestimonialStore};
pub use gallery::{Gallery, GalleryCard};
pub use model::{Testimonial, TestimonialUpdate, VideoDisplay, VideoSource, youtube_embed_url};
pub use routes::{TestimonialRouteState, testimonial_routes};
