//=====================================================
// File: host.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Boundary between the runtime and the user interface
// Objective: Define the only calls the runtime makes into the UI layer and
//            the resolved destination it hands over for navigation
//=====================================================

use std::sync::Arc;

use crate::document::{PartId, StackDocument};
use crate::interpreter::errors::HtResult;
use crate::value::Value;

/// Where navigation should land. The UI performs the window and animation
/// work; the runtime has already decided which card is meant.
#[derive(Debug, Clone)]
pub struct Destination {
    pub stack: Arc<StackDocument>,
    pub card: PartId,
    pub visual_effect: Option<String>,
}

pub trait Host: Send + Sync {
    /// The stack whose window has focus, if any.
    fn focused_stack(&self) -> Option<Arc<StackDocument>>;

    fn find_stack(&self, name: &str) -> Option<Arc<StackDocument>>;

    fn navigate(&self, destination: &Destination);

    /// Returns to the previous destination, if there is one.
    fn go_back(&self) -> Option<Destination>;

    fn beep(&self);

    fn show_message(&self, text: &str);

    fn selected_text(&self) -> HtResult<Value>;
}

//=====================================================
// End of file
//=====================================================
