//! Domain types shared between the LAN request path and the relay path.
//!
//! Nothing in this module performs I/O.  The types describe *what* the host
//! is asked to do; the host application decides *how* to do it.

pub mod request;
pub mod settings;

pub use request::{
    ControlKey, InjectionRequest, MuteImmediateRequest, MuteImmediateResponse, MutePolicyRequest,
    MutePolicyResponse, TypeRequest, TypeResponse,
};
pub use settings::{PasteConfig, SharedPasteConfig};
