//! Document model types for markup transcoding.
//!
//! This module defines the working representation every pipeline stage
//! operates on: an arena document tree, parsed inline styles, and image
//! descriptors derived from `img` elements.

mod dom;
mod image;
mod style;

pub use dom::{Document, Element, ElementKind, Node, NodeData, NodeId};
pub use image::{parse_pixel_attribute, ImageDescriptor, ImageSource, IntrinsicSize};
pub use style::{format_number, format_px, Declaration, Length, LengthUnit, Style, StyleMap};
