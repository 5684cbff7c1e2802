//! tiepoint — point-correspondence annotation core.
//!
//! An operator builds pixel-level point correspondences between two
//! co-registered images (an optical tile and a radar tile) by clicking
//! alternately on each; the pairs are persisted as CSV for downstream
//! image-registration work. This crate is the headless core: coordinate
//! transforms, paired-view zoom/pan synchronization, the turn-taking
//! correspondence store, the session state machine and the CSV round-trip.
//! Window chrome, dialogs and bitmap display belong to the host, reached
//! through the contracts in [`host`].

pub mod config;
pub mod correspondence;
pub mod host;
pub mod keys;
pub mod points_csv;
pub mod session;
pub mod tiles;
pub mod transform;
pub mod view_sync;

pub use correspondence::{CorrespondenceStore, Point, PointPair, Turn};
pub use host::{FsImageProbe, ImageProbe, RenderState, UnsavedChoice, UnsavedPrompt};
pub use session::{AnnotationSession, CheckControls, Mode, SessionAction, SessionError};
pub use transform::{DevicePoint, Transform};
pub use view_sync::{ViewSide, ViewState, ViewSync};
