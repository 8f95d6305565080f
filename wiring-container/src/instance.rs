//! Type-erased resolved instances.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::key::TypeKey;

/// A resolved object, erased to its contract.
///
/// The payload is always an `Arc<A>` where `A` is the contract the entry
/// was registered under, so [`Instance::downcast`] hands back a cheap
/// clone of the same allocation. Cloning an `Instance` never copies the
/// object.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    contract: TypeKey,
    concrete: TypeKey,
}

impl Instance {
    /// Erases `value` under contract `A`. `concrete` names the type that
    /// was actually built.
    pub fn new<A: ?Sized + Send + Sync + 'static>(value: Arc<A>, concrete: TypeKey) -> Self {
        Self {
            value: Arc::new(value),
            contract: TypeKey::of::<A>(),
            concrete,
        }
    }

    /// The contract this instance satisfies.
    #[inline]
    pub fn contract(&self) -> TypeKey {
        self.contract
    }

    /// The type that was constructed.
    #[inline]
    pub fn concrete(&self) -> TypeKey {
        self.concrete
    }

    /// Recovers the contract-typed handle.
    ///
    /// Returns `None` if `A` is not the contract of this instance.
    pub fn downcast<A: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<A>> {
        self.value.downcast_ref::<Arc<A>>().cloned()
    }

    /// Returns `true` if both handles point at the same resolved object.
    pub fn same_object(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("contract", &self.contract)
            .field("concrete", &self.concrete)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    #[test]
    fn downcast_to_contract() {
        let greeter: Arc<dyn Greeter> = Arc::new(English);
        let instance = Instance::new(greeter, TypeKey::of::<English>());

        assert_eq!(instance.contract(), TypeKey::of::<dyn Greeter>());
        assert_eq!(instance.concrete(), TypeKey::of::<English>());

        let back = instance.downcast::<dyn Greeter>().unwrap();
        assert_eq!(back.greet(), "hello");
        assert!(instance.downcast::<English>().is_none());
    }

    #[test]
    fn clones_share_the_object() {
        let instance = Instance::new(Arc::new(7u32), TypeKey::of::<u32>());
        let copy = instance.clone();
        assert!(instance.same_object(&copy));

        let a = instance.downcast::<u32>().unwrap();
        let b = copy.downcast::<u32>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let other = Instance::new(Arc::new(7u32), TypeKey::of::<u32>());
        assert!(!instance.same_object(&other));
    }
}
