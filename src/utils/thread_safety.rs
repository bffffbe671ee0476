#[cfg(feature = "thread_safe")]
mod thread_safe {
    use alloc::sync::Arc;
    use core::any::Any;

    pub trait SendSafety: Send {}
    pub trait SyncSafety: Sync {}

    impl<T: Send + ?Sized> SendSafety for T {}
    impl<T: Sync + ?Sized> SyncSafety for T {}

    pub type RcThreadSafety<T> = Arc<T>;
    pub type RcAnyThreadSafety = RcThreadSafety<dyn Any + Send + Sync>;

    pub(crate) type Lock<T> = parking_lot::RwLock<T>;
}

#[cfg(not(feature = "thread_safe"))]
mod thread_unsafe {
    use alloc::rc::Rc;
    use core::{
        any::Any,
        cell::{Ref, RefCell, RefMut},
    };

    pub trait SendSafety {}
    pub trait SyncSafety {}

    impl<T: ?Sized> SendSafety for T {}
    impl<T: ?Sized> SyncSafety for T {}

    pub type RcThreadSafety<T> = Rc<T>;
    pub type RcAnyThreadSafety = RcThreadSafety<dyn Any>;

    /// Single-threaded stand-in for [`parking_lot::RwLock`] with the same call shape.
    #[derive(Default)]
    pub(crate) struct Lock<T>(RefCell<T>);

    impl<T> Lock<T> {
        #[inline]
        #[must_use]
        pub(crate) const fn new(value: T) -> Self {
            Self(RefCell::new(value))
        }

        #[inline]
        pub(crate) fn read(&self) -> Ref<'_, T> {
            self.0.borrow()
        }

        #[inline]
        pub(crate) fn write(&self) -> RefMut<'_, T> {
            self.0.borrow_mut()
        }
    }
}

#[cfg(feature = "thread_safe")]
pub use thread_safe::{RcAnyThreadSafety, RcThreadSafety, SendSafety, SyncSafety};
#[cfg(feature = "thread_safe")]
pub(crate) use thread_safe::Lock;

#[cfg(not(feature = "thread_safe"))]
pub(crate) use thread_unsafe::Lock;
#[cfg(not(feature = "thread_safe"))]
pub use thread_unsafe::{RcAnyThreadSafety, RcThreadSafety, SendSafety, SyncSafety};

/// Compares two shared pointers by the address of their data, ignoring vtables.
#[inline]
#[must_use]
pub(crate) fn same_data<T: ?Sized, U: ?Sized>(left: &RcThreadSafety<T>, right: &RcThreadSafety<U>) -> bool {
    core::ptr::addr_eq(RcThreadSafety::as_ptr(left), RcThreadSafety::as_ptr(right))
}
