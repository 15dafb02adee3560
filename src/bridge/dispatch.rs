use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use dashmap::DashMap;

use crate::{
    bridge::{HookBackend, HookHandle, MemberHook},
    metadata::{
        member::{Member, MemberKind, MemberRc},
        token::Token,
    },
    Error, Result,
};

type HookList = Vec<(u64, Arc<dyn MemberHook>)>;

/// In-process [`HookBackend`] keeping a hook table per member token.
///
/// [`HookBackend::hooks_for`] returns a snapshot, so hooks run without any table lock held and
/// may attach or detach hooks themselves.
#[derive(Default)]
pub struct DispatchBackend {
    hooks: DashMap<Token, HookList>,
    next_id: AtomicU64,
}

impl DispatchBackend {
    /// Create a backend without any hooks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of hooked members
    pub fn hooked_members(&self) -> usize {
        self.hooks.len()
    }
}

impl HookBackend for DispatchBackend {
    fn attach(&self, member: &MemberRc, hook: Arc<dyn MemberHook>) -> Result<HookHandle> {
        if member.kind == MemberKind::Field {
            return Err(Error::HookError(format!("can not hook field {member}")));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.hooks.entry(member.token).or_default().push((id, hook));
        log::trace!("Attached hook {} to {}", id, member);

        Ok(HookHandle {
            member: member.token,
            id,
        })
    }

    fn detach(&self, handle: &HookHandle) -> Result<()> {
        let detached = match self.hooks.get_mut(&handle.member) {
            Some(mut list) => {
                let before = list.len();
                list.retain(|(id, _)| *id != handle.id);
                before != list.len()
            }
            None => false,
        };
        self.hooks.remove_if(&handle.member, |_, list| list.is_empty());

        if detached {
            Ok(())
        } else {
            Err(Error::HookError(format!(
                "hook {} is not attached to {}",
                handle.id, handle.member
            )))
        }
    }

    fn hooks_for(&self, member: &Member) -> Vec<Arc<dyn MemberHook>> {
        self.hooks
            .get(&member.token)
            .map(|list| list.iter().map(|(_, hook)| hook.clone()).collect())
            .unwrap_or_default()
    }
}
