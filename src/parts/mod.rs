//=====================================================
// File: parts.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Part addressing for HyperTalk scripts
// Objective: Group part specifiers, the scope finders that resolve them, and
//            the handles resolution produces
//=====================================================

pub mod finder;
pub mod handle;
pub mod specifier;

pub use finder::{BackgroundScope, CardScope, Found, PartFinder, PartRef, StackScope};
pub use handle::PartHandle;
pub use specifier::PartSpecifier;

//=====================================================
// End of file
//=====================================================
