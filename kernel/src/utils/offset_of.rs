/// Returns the offset of a field in a struct, works like `offsetof` macro
/// in C.
///
/// Structs with `#[repr(Rust)]` are not guaranteed to have a stable layout,
/// so [`offset_of!`] might not work as expected. `#[repr(C)]` is recommended
/// for structs that should be used with [`offset_of!`].
#[macro_export]
macro_rules! offset_of {
    ($container:ty, $field:ident) => {
        unsafe { &(*(0 as *const $container)).$field as *const _ as usize }
    };
}

/// Recovers a `&mut $container` from a raw pointer to one of its embedded
/// [`Node`](crate::utils::data_structures::linked_list::Node) fields.
///
/// This is the `container_of` half of the intrusive [`LinkedList`]: the list
/// only ever stores `*mut Node<T>`, so anything that pops or iterates one
/// needs this macro to get back to the structure that embeds the node.
///
/// # Safety
/// `node` must be a valid, non-null pointer to the `$field` member of a live
/// `$container` value.
#[macro_export]
macro_rules! get_list_element {
    ($node:expr, $container:ty, $field:ident) => {{
        let node_ptr: *mut $crate::utils::data_structures::linked_list::Node<_> = $node;
        let offset = $crate::offset_of!($container, $field);
        unsafe { &mut *((node_ptr as *mut u8).sub(offset) as *mut $container) }
    }};
}
