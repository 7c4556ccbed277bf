//! Opaque plugin capability for the selection surface
//!
//! Plugins add custom rows or interactions to whatever surface lists the
//! configurations (development tools, log viewers). The core never
//! interprets them beyond holding the list.

/// Marker for the host surface handed to a plugin on interaction. The
/// embedding application decides what this actually is.
pub trait HostContext {}

pub trait ConfigPlugin {
    /// How the plugin should be listed.
    fn display_name(&self) -> String;

    /// Optional value shown next to the name.
    fn display_value(&self) -> Option<String> {
        None
    }

    /// Invoked when the plugin is activated from the host surface.
    fn interact(&mut self, host: &mut dyn HostContext);
}
