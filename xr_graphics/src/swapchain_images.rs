/// Storage for runtime-filled swapchain image structs
///
/// The runtime enumerates a swapchain's images into caller-provided structs
/// whose type tag must already be set. The arena allocates one contiguous
/// slice per swapchain and keeps every slice alive, at a stable address, for
/// its own lifetime.

use std::ptr::NonNull;

/// A runtime image struct the plugin can pre-type
pub trait SwapchainImageStruct: Sized {
    /// Struct with its type tag set and every other field zeroed
    fn new_typed() -> Self;
}

/// Pointers into one arena allocation
#[derive(Debug)]
pub struct SwapchainImages<T> {
    /// Which arena allocation the pointers belong to
    pub buffer_index: usize,
    /// One pointer per image, in enumeration order
    pub images: Vec<NonNull<T>>,
}

impl<T> SwapchainImages<T> {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Start of the contiguous run, as handed to the runtime's enumerate call
    pub fn as_mut_ptr(&self) -> Option<*mut T> {
        self.images.first().map(|image| image.as_ptr())
    }
}

pub struct SwapchainImageArena<T> {
    buffers: Vec<Box<[T]>>,
}

impl<T> Default for SwapchainImageArena<T> {
    fn default() -> Self {
        Self { buffers: Vec::new() }
    }
}

impl<T: SwapchainImageStruct> SwapchainImageArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `capacity` typed structs
    pub fn allocate(&mut self, capacity: usize) -> SwapchainImages<T> {
        let mut buffer: Box<[T]> = (0..capacity).map(|_| T::new_typed()).collect();
        let images = buffer.iter_mut().map(NonNull::from).collect();
        let buffer_index = self.buffers.len();
        self.buffers.push(buffer);
        SwapchainImages { buffer_index, images }
    }

    /// Struct `index` of an allocation made by this arena
    pub fn get(&self, images: &SwapchainImages<T>, index: usize) -> Option<&T> {
        self.buffers.get(images.buffer_index)?.get(index)
    }

    pub fn get_mut(&mut self, images: &SwapchainImages<T>, index: usize) -> Option<&mut T> {
        self.buffers.get_mut(images.buffer_index)?.get_mut(index)
    }

    /// Number of allocations
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Drop every allocation
    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}

#[cfg(test)]
#[path = "swapchain_images_tests.rs"]
mod tests;
