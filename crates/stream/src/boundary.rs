// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Safe-boundary scan over a catch-up batch.

use crate::envelope::BoundaryRole;

/// Tracks the last index at which every model response seen so far was
/// closed.
///
/// A position is safe when its event is a terminal status, or closes a
/// response and leaves no response open. The batch may be trimmed only if
/// nothing is open at the end of the scan and every close had a matching
/// open earlier in the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundaryScan {
    last_safe: Option<usize>,
    open: u32,
    /// A close arrived with no open response before it
    unbalanced: bool,
}

impl BoundaryScan {
    pub fn scan(roles: impl IntoIterator<Item = BoundaryRole>) -> Self {
        let mut scan = Self::default();
        for (index, role) in roles.into_iter().enumerate() {
            scan.push(index, role);
        }
        scan
    }

    pub fn push(&mut self, index: usize, role: BoundaryRole) {
        match role {
            BoundaryRole::Open => self.open += 1,
            BoundaryRole::Close => match self.open.checked_sub(1) {
                Some(open) => {
                    self.open = open;
                    if open == 0 && !self.unbalanced {
                        self.last_safe = Some(index);
                    }
                }
                None => self.unbalanced = true,
            },
            BoundaryRole::Terminal => self.last_safe = Some(index),
            BoundaryRole::Neutral => {}
        }
    }

    pub fn last_safe(&self) -> Option<usize> {
        self.last_safe
    }

    pub fn open_responses(&self) -> u32 {
        self.open
    }

    /// Whether every close seen so far matched an earlier open.
    pub fn is_balanced(&self) -> bool {
        !self.unbalanced
    }

    /// Index through which the batch may be trimmed.
    pub fn trim_point(&self) -> Option<usize> {
        if self.open == 0 && !self.unbalanced {
            self.last_safe
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "boundary_tests.rs"]
mod tests;
