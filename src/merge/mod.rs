//! Merge of several arrays of one type into a single ascending order.
//!
//! [`merge_sorted_indices`] yields one [`ArrayItemIndex`] per input element;
//! the helpers in [`index`] turn that into Arrow arrays or gather the values.

mod compare;
pub mod index;
mod kernel;

pub use index::{
    ARRAY_ID_FIELD, ArrayItemIndex, OFFSET_FIELD, indices_from_fixed_size_binary,
    indices_to_fixed_size_binary, indices_to_struct, take_indices,
};
pub use kernel::merge_sorted_indices;
