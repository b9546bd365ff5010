//! Application context.
//!
//! [`ViewerContext`] ties the pieces together for a presentation layer:
//!
//! ```text
//! ┌──────────────────────────── ViewerContext ────────────────────────────┐
//! │                                                                       │
//! │  Arc<Catalog> ──┬──► AcquisitionWorker (own thread) ──► EventSender ──┼──► consumer
//! │                 │            │ publish                                │
//! │                 │            ▼                                        │
//! │                 └──► Arc<RecordStore> ◄── Session (navigation)        │
//! │                                 │                                     │
//! │                                 ▼ original                            │
//! │                       Renderer + DisplayCache ──► export              │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cupola::acquisition::event_channel;
//! use cupola::app::ViewerContext;
//! use cupola::config::ConfigFile;
//! use cupola::transform::Viewport;
//!
//! let mut ctx = ViewerContext::from_config(&ConfigFile::load()?)?;
//! let (tx, mut rx) = event_channel();
//! let worker = ctx.start_acquisition(tx)?;
//! while let Some(event) = rx.blocking_recv() {
//!     println!("{}", event.describe());
//! }
//! worker.join().ok();
//!
//! ctx.show_image("Window 0", 0)?;
//! let bitmap = ctx.render_current(Viewport::new(1200, 800))?;
//! ```

mod context;
mod error;

pub use context::ViewerContext;
pub use error::AppError;
