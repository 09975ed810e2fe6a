//! Per-block background execution.
//!
//! Every dynamic block runs two threads sharing one `TransitionScheduler`:
//! - observe: samples the screen every `sample_interval`, accepts changes
//!   above the hysteresis threshold and retargets the scheduler
//! - animate: advances the transition every `frame_interval` and hands
//!   changed frames to the [`FrameSink`]
//!
//! Screen capture and rasterization never run under the scheduler's lock.
//! The [`Coordinator`] owns the threads and stops them cooperatively.

mod animate;
mod coordinator;
mod frame;
mod observe;
mod stop;

pub use coordinator::Coordinator;
pub use frame::{
    AdaptationEvent, BlockId, ChannelSink, EngineEvent, Frame, FrameSink, GeometryProvider, Paint,
    SharedGeometry,
};
pub use observe::DominantTracker;
pub use stop::{StopSignal, StopTrigger};
