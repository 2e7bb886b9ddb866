mod command;
mod compose;
mod patch;
mod repository;

pub use compose::DiffComposer;

#[cfg(test)]
mod testing;
