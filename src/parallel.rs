use std::sync::Arc;

use crate::{error::ReadError, reader::ReadAt, Error, Result, TwoBitReader};

/// Trait for types that can process sequences in parallel.
///
/// This is implemented by the **processor** not by the **reader**.
/// Each thread receives its own clone of the processor.
pub trait ParallelProcessor: Send + Clone {
    /// Process a single decoded sequence
    fn process_sequence(&mut self, name: &str, sequence: &[u8]) -> Result<()>;

    /// Called when a thread finishes processing its share of the sequences
    /// Default implementation does nothing
    fn on_batch_complete(&mut self) -> Result<()> {
        Ok(())
    }

    /// Set the thread ID for this processor
    ///
    /// Each thread should call this method with its own unique ID.
    fn set_tid(&mut self, _tid: usize) {
        // Default implementation does nothing
    }

    /// Get the thread ID for this processor
    fn get_tid(&self) -> Option<usize> {
        None
    }
}

impl<S: ReadAt + Send + Sync + 'static> TwoBitReader<S> {
    /// Decodes every sequence of the file across multiple threads
    ///
    /// Sequences are split into contiguous chunks of the file order, one per thread.
    /// A `num_threads` of zero uses every available core.
    ///
    /// # Arguments
    ///
    /// * `processor` - The processor to use for each sequence
    /// * `num_threads` - The number of threads to spawn
    pub fn process_parallel<P: ParallelProcessor + 'static>(
        self,
        processor: P,
        num_threads: usize,
    ) -> Result<()> {
        // Calculate the number of threads to use
        let num_threads = if num_threads == 0 {
            num_cpus::get()
        } else {
            num_threads.min(num_cpus::get())
        };

        let names: Arc<Vec<String>> = Arc::new(self.names().map(str::to_string).collect());
        let per_thread = names.len().div_ceil(num_threads.max(1));
        let reader = Arc::new(self);

        let mut handles = Vec::new();
        for tid in 0..num_threads {
            let mut processor = processor.clone();
            let reader = reader.clone();
            let names = names.clone();
            processor.set_tid(tid);

            let handle = std::thread::spawn(move || -> Result<()> {
                let start_idx = tid * per_thread;
                let end_idx = (start_idx + per_thread).min(names.len());
                if start_idx >= end_idx {
                    return Ok(()); // No sequences for this thread
                }

                // reusable decoding buffer
                let mut dbuf = Vec::new();
                for name in &names[start_idx..end_idx] {
                    match reader.read_range_into(name, 0, 0, &mut dbuf) {
                        Ok(()) => {}
                        // empty sequences have no valid range
                        Err(Error::ReadError(ReadError::InvalidRange { .. })) => {
                            dbuf.clear();
                        }
                        Err(e) => return Err(e),
                    }
                    processor.process_sequence(name, &dbuf)?;
                }
                processor.on_batch_complete()?;
                Ok(())
            });

            handles.push(handle);
        }

        for handle in handles {
            match handle.join() {
                Ok(result) => result?,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }

        Ok(())
    }
}
