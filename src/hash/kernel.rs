//! Hash kernel drivers: one pass over an input array feeding a memo table
//! and an [`Action`].

use std::sync::{Arc, Mutex};

use arrow::array::{Array, ArrayRef, NullArray};
use arrow::datatypes::DataType;
use log::debug;

use crate::core::KernelError;
use crate::hash::action::Action;
use crate::hash::memo::{Lookup, MemoTable};

/// A reusable hash kernel. Appending several arrays accumulates into one
/// dictionary; [`HashKernel::reset`] starts a fresh distinct-value universe.
pub trait HashKernel: Send {
    /// Value type this kernel accepts.
    fn data_type(&self) -> &DataType;

    /// Forget the memo table and all action state.
    fn reset(&mut self);

    /// Run one pass over `array`.
    fn append(&mut self, array: &dyn Array) -> Result<(), KernelError>;

    /// Output of the last append (dictionary indices for dictionary encode).
    fn flush(&mut self) -> Result<Option<ArrayRef>, KernelError>;

    /// Output covering every append since the last reset (value counts).
    fn flush_final(&mut self) -> Result<Option<ArrayRef>, KernelError>;

    /// Distinct values seen so far, in first-seen order.
    fn dictionary(&self) -> Result<ArrayRef, KernelError>;
}

fn check_type(expected: &DataType, array: &dyn Array) -> Result<(), KernelError> {
    if array.data_type() != expected {
        return Err(KernelError::InvalidInput(format!(
            "kernel for {expected} cannot append an array of {}",
            array.data_type()
        )));
    }
    Ok(())
}

/// Driver for every type that carries values.
pub struct RegularHashKernel<M: MemoTable, A: Action> {
    data_type: DataType,
    memo_table: M,
    action: A,
}

impl<M: MemoTable, A: Action> RegularHashKernel<M, A> {
    pub fn try_new(data_type: DataType, capacity: usize) -> Result<Self, KernelError> {
        let memo_table = M::try_new(&data_type, capacity)?;
        Ok(Self {
            data_type,
            memo_table,
            action: A::default(),
        })
    }

    fn visit_null(&mut self) -> Result<(), KernelError> {
        if !A::MEMOIZE_NULLS {
            return self.action.observe_null_not_found(None);
        }
        match self.memo_table.get_or_insert_null()? {
            Lookup::Found(index) => self.action.observe_null_found(Some(index)),
            Lookup::Inserted(index) => self.action.observe_null_not_found(Some(index)),
        }
    }

    fn visit_value(&mut self, value: M::Value<'_>) -> Result<(), KernelError> {
        match self.memo_table.get_or_insert(value)? {
            Lookup::Found(index) => self.action.observe_found(index),
            Lookup::Inserted(index) => self.action.observe_not_found(index),
        }
    }
}

impl<M: MemoTable, A: Action> HashKernel for RegularHashKernel<M, A> {
    fn data_type(&self) -> &DataType {
        &self.data_type
    }

    fn reset(&mut self) {
        self.memo_table.clear();
        self.action.reset();
    }

    fn append(&mut self, array: &dyn Array) -> Result<(), KernelError> {
        check_type(&self.data_type, array)?;
        let typed = array.as_any().downcast_ref::<M::Array>().ok_or_else(|| {
            KernelError::Internal(format!(
                "{} kernel could not downcast {}",
                A::NAME,
                array.data_type()
            ))
        })?;

        self.action.reserve(typed.len())?;
        match typed.nulls().filter(|nulls| nulls.null_count() > 0) {
            None => {
                for i in 0..typed.len() {
                    self.visit_value(M::value(typed, i))?;
                }
            }
            Some(nulls) => {
                for i in 0..typed.len() {
                    if nulls.is_null(i) {
                        self.visit_null()?;
                    } else {
                        self.visit_value(M::value(typed, i))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<Option<ArrayRef>, KernelError> {
        self.action.flush()
    }

    fn flush_final(&mut self) -> Result<Option<ArrayRef>, KernelError> {
        self.action.flush_final()
    }

    fn dictionary(&self) -> Result<ArrayRef, KernelError> {
        self.memo_table.to_array(&self.data_type)
    }
}

/// Driver for the null type: no values, so no memo table. The first position
/// ever observed opens the single null slot and every later one finds it.
pub struct NullHashKernel<A: Action> {
    data_type: DataType,
    seen_null: bool,
    action: A,
}

impl<A: Action> Default for NullHashKernel<A> {
    fn default() -> Self {
        Self {
            data_type: DataType::Null,
            seen_null: false,
            action: A::default(),
        }
    }
}

impl<A: Action> NullHashKernel<A> {
    fn null_slot() -> Option<i32> {
        A::MEMOIZE_NULLS.then_some(0)
    }
}

impl<A: Action> HashKernel for NullHashKernel<A> {
    fn data_type(&self) -> &DataType {
        &self.data_type
    }

    fn reset(&mut self) {
        self.seen_null = false;
        self.action.reset();
    }

    fn append(&mut self, array: &dyn Array) -> Result<(), KernelError> {
        check_type(&self.data_type, array)?;
        self.action.reserve(array.len())?;
        for _ in 0..array.len() {
            if self.seen_null {
                self.action.observe_null_found(Self::null_slot())?;
            } else {
                self.seen_null = true;
                self.action.observe_null_not_found(Self::null_slot())?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<Option<ArrayRef>, KernelError> {
        self.action.flush()
    }

    fn flush_final(&mut self) -> Result<Option<ArrayRef>, KernelError> {
        self.action.flush_final()
    }

    fn dictionary(&self) -> Result<ArrayRef, KernelError> {
        let len = usize::from(A::MEMOIZE_NULLS && self.seen_null);
        Ok(Arc::new(NullArray::new(len)))
    }
}

/// A kernel that several threads can feed chunks into. Each append holds the
/// lock for its whole pass, so two chunks never interleave in the memo table.
pub struct SharedHashKernel {
    inner: Mutex<Box<dyn HashKernel>>,
}

impl SharedHashKernel {
    pub fn new(kernel: Box<dyn HashKernel>) -> Self {
        Self {
            inner: Mutex::new(kernel),
        }
    }

    fn with_kernel<R>(
        &self,
        f: impl FnOnce(&mut dyn HashKernel) -> Result<R, KernelError>,
    ) -> Result<R, KernelError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| KernelError::Internal("hash kernel lock poisoned".into()))?;
        f(&mut **guard)
    }

    pub fn reset(&self) -> Result<(), KernelError> {
        self.with_kernel(|kernel| {
            kernel.reset();
            Ok(())
        })
    }

    /// Append one chunk and flush its per-chunk output under the same lock.
    ///
    /// A failed append still flushes, so output written before the failure
    /// never leaks into the next caller's chunk.
    pub fn append(&self, array: &dyn Array) -> Result<Option<ArrayRef>, KernelError> {
        self.with_kernel(|kernel| match kernel.append(array) {
            Ok(()) => kernel.flush(),
            Err(err) => {
                if let Err(flush_err) = kernel.flush() {
                    debug!("discarding partial output failed: {flush_err}");
                }
                Err(err)
            }
        })
    }

    pub fn flush_final(&self) -> Result<Option<ArrayRef>, KernelError> {
        self.with_kernel(|kernel| kernel.flush_final())
    }

    pub fn dictionary(&self) -> Result<ArrayRef, KernelError> {
        self.with_kernel(|kernel| kernel.dictionary())
    }

    pub fn into_inner(self) -> Result<Box<dyn HashKernel>, KernelError> {
        self.inner
            .into_inner()
            .map_err(|_| KernelError::Internal("hash kernel lock poisoned".into()))
    }
}
