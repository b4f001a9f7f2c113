pub mod context;
pub mod mem_allocator;
