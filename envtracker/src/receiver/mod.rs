//! Source receivers.
//!
//! One receiver per source kind. Each owns the tasks that talk to its
//! platform seam and dispatches readings through the listener registry. The
//! supervising tracker drives all of them through [`SourceReceiver`], which
//! is also what lets reconfiguration be expressed once as an on/off diff
//! instead of four hand-written transitions.

use std::future::Future;

mod bluetooth;
mod cell;
mod gps;
mod wifi;

pub(crate) use bluetooth::BluetoothReceiver;
pub(crate) use cell::CellReceiver;
pub(crate) use gps::GpsReceiver;
pub(crate) use wifi::WifiReceiver;

/// Lifecycle contract every receiver implements.
///
/// `register` starts the receiver's tasks, `unregister` stops them and
/// waits for them to finish. The pair may be cycled; a receiver must come
/// back up cleanly after `unregister`. `reload_configuration` applies new
/// parameters to a registered receiver and must not tear it down when the
/// parameters are unchanged.
pub(crate) trait SourceReceiver {
    /// Parameter type applied on reload.
    type Params;

    fn register(&mut self) -> impl Future<Output = ()> + Send;

    fn unregister(&mut self) -> impl Future<Output = ()> + Send;

    fn reload_configuration(&mut self, params: Self::Params) -> impl Future<Output = ()> + Send;
}

/// Applies one source's enabled-flag transition to its receiver slot.
///
/// Newly enabled sources are constructed and registered, newly disabled
/// ones are unregistered and dropped, and sources that stay enabled get the
/// new parameters handed to their running receiver.
pub(crate) async fn apply_source_diff<R, F>(
    was_enabled: bool,
    now_enabled: bool,
    slot: &mut Option<R>,
    params: R::Params,
    construct: F,
) where
    R: SourceReceiver,
    F: FnOnce(R::Params) -> R,
{
    match (was_enabled, now_enabled) {
        (false, true) => {
            let mut receiver = construct(params);
            receiver.register().await;
            *slot = Some(receiver);
        }
        (true, false) => {
            if let Some(mut receiver) = slot.take() {
                receiver.unregister().await;
            }
        }
        (true, true) => {
            if let Some(receiver) = slot.as_mut() {
                receiver.reload_configuration(params).await;
            }
        }
        (false, false) => {}
    }
}
