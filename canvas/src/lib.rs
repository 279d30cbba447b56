//! Scene core for the sketchboard editor.
//!
//! This crate owns everything between a pointer gesture and the persisted
//! collection: the object model and its transforms, hit-testing and
//! selection handles, the gesture state machine, the eraser subtraction
//! engine, and the coordinator that applies its results. The host is
//! responsible only for delivering input events, backing the [`render::Painter`]
//! with a real surface, and performing the [`engine::Action`]s it is handed
//! (in particular writing the collection to storage).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Input engine ([`engine::EngineCore`]) producing host actions |
//! | [`scene`] | Scene mutation coordinator: collection, selection, active group |
//! | [`doc`] | Drawable objects, the transient eraser, order tokens |
//! | [`geom`] | Points, bounds, local↔world transforms |
//! | [`text`] | Text measurement seam and metrics |
//! | [`hit`] | Hit-testing and selection-handle layout |
//! | [`input`] | Tools, keys and the gesture state machine |
//! | [`erase`] | Eraser subtraction engine (stroke splitting, raster subtraction) |
//! | [`persist`] | Stored format: normalization, legacy migration input, stores |
//! | [`render`] | Scene drawing through the [`render::Painter`] seam |
//! | [`consts`] | Shared numeric constants (handle sizes, defaults, etc.) |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod erase;
pub mod geom;
pub mod hit;
pub mod input;
pub mod persist;
pub mod render;
pub mod scene;
pub mod text;
