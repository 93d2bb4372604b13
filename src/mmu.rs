// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Sparse, paged memory for the [Executor](crate::Executor)
//!
//! Memory is split into 512-cell pages stored in a hashmap keyed by the address of each page's
//! first cell, so programs can write to addresses far beyond the end of their own code without
//! allocating everything in between. Any cell that was never written reads as `0`.

use itertools::Itertools;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::{Index, IndexMut, Range};
use thiserror::Error;

const PAGE_SIZE: usize = 512;
const PAGE_MASK: i64 = 0x1ff;

macro_rules! page_index {
    ($i: expr) => {{
        #[allow(clippy::cast_sign_loss, reason = "masked down anyway")]
        {
            ($i & PAGE_MASK) as usize
        }
    }};
}

macro_rules! page_base {
    ($i: expr) => {{ $i & !PAGE_MASK }};
}

/// A memory access used a negative address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("attempted to access negative memory address {0}")]
pub struct InvalidAddress(pub i64);

static EMPTY: [i64; PAGE_SIZE] = [0; PAGE_SIZE];

/// Sparse memory addressed by non-negative `i64`s
pub struct Memory {
    pages: HashMap<i64, Box<[i64; PAGE_SIZE]>>,
    highest_written: Option<i64>,
}

impl Memory {
    /// Create an empty memory, in which every address reads as `0`
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            highest_written: None,
        }
    }

    fn check(address: i64) -> Result<i64, InvalidAddress> {
        if address < 0 {
            Err(InvalidAddress(address))
        } else {
            Ok(address)
        }
    }

    fn cell(&self, address: i64) -> i64 {
        self.pages
            .get(&page_base!(address))
            .map_or(0, |page| page[page_index!(address)])
    }

    fn cell_mut(&mut self, address: i64) -> &mut i64 {
        self.highest_written = Some(self.highest_written.map_or(address, |h| h.max(address)));
        &mut self
            .pages
            .entry(page_base!(address))
            .or_insert_with(|| Box::new([0; PAGE_SIZE]))[page_index!(address)]
    }

    /// Read the value at `address`, which is `0` if it was never written
    #[doc(alias = "peek")]
    pub fn read(&self, address: i64) -> Result<i64, InvalidAddress> {
        Ok(self.cell(Self::check(address)?))
    }

    /// Store `value` at `address`
    #[doc(alias = "poke")]
    pub fn write(&mut self, address: i64, value: i64) -> Result<(), InvalidAddress> {
        *self.cell_mut(Self::check(address)?) = value;
        Ok(())
    }

    /// The highest address that has been written to, including addresses filled when loading a
    /// program. Returns [`None`] for a memory that has never been written to.
    pub fn highest_written_address(&self) -> Option<i64> {
        self.highest_written
    }

    /// Every non-zero cell as `(address, value)`, in address order. Only allocated pages are
    /// visited, however far apart they are.
    pub fn cells(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.pages
            .iter()
            .sorted_unstable_by_key(|&(&base, _)| base)
            .flat_map(|(&base, page)| {
                (0..=PAGE_MASK)
                    .zip(page.iter().copied())
                    .filter(|&(_, value)| value != 0)
                    .map(move |(offset, value)| (base + offset, value))
            })
    }

    fn active_pages(&self) -> BTreeSet<i64> {
        self.pages
            .iter()
            .filter_map(|(&k, v)| (v.as_ref() != &EMPTY).then_some(k))
            .collect()
    }

    /// Remove all pages that are filled with zeroes, and shrink the page table's allocation
    pub fn prune(&mut self) {
        self.pages.retain(|_, page| page[..] != EMPTY);
        self.pages.shrink_to_fit();
    }

    fn page(&self, base: i64) -> &[i64; PAGE_SIZE] {
        self.pages.get(&base).map_or(&EMPTY, AsRef::as_ref)
    }

    /// Get the contents of `range`. Only copies if `range` spans more than one page.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "range bounds are checked to be non-negative"
    )]
    pub fn get_range(&self, range: Range<i64>) -> Result<Cow<'_, [i64]>, InvalidAddress> {
        let first = Self::check(range.start)?;
        if range.end <= first {
            return Ok(Cow::Borrowed(&[]));
        }
        let last = range.end - 1;
        let first_page = page_base!(first);
        let last_page = page_base!(last);
        if first_page == last_page {
            Ok(Cow::Borrowed(
                &self.page(first_page)[page_index!(first)..=page_index!(last)],
            ))
        } else {
            let mut v = Vec::with_capacity((range.end - first) as usize);
            v.extend_from_slice(&self.page(first_page)[page_index!(first)..]);
            for base in ((first_page + PAGE_MASK + 1)..last_page).step_by(PAGE_SIZE) {
                v.extend_from_slice(self.page(base));
            }
            v.extend_from_slice(&self.page(last_page)[..=page_index!(last)]);
            Ok(Cow::Owned(v))
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Memory {
    fn eq(&self, other: &Self) -> bool {
        let active_pages = self.active_pages();
        other.active_pages() == active_pages
            && active_pages
                .into_iter()
                .all(|base| self.pages[&base] == other.pages[&base])
    }
}

impl FromIterator<i64> for Memory {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let iter = iter.into_iter();

        let mut pages = HashMap::with_capacity(iter.size_hint().0.div_ceil(PAGE_SIZE));
        let mut base = 0;
        let mut loaded = 0;

        for chunk in &iter.chunks(PAGE_SIZE) {
            let mut page = Box::new([0; PAGE_SIZE]);
            for (cell, value) in page.iter_mut().zip(chunk) {
                *cell = value;
                loaded += 1;
            }
            pages.insert(base, page);
            base += PAGE_MASK + 1;
        }

        Self {
            pages,
            highest_written: (loaded > 0).then(|| loaded - 1),
        }
    }
}

/// Read-only indexing, mirroring [`Memory::read`]
///
/// # Panics
///
/// Panics if `address` is negative
impl Index<i64> for Memory {
    type Output = i64;
    fn index(&self, address: i64) -> &i64 {
        assert!(address >= 0, "negative memory address {address}");
        self.pages
            .get(&page_base!(address))
            .map_or(&0, |page| &page[page_index!(address)])
    }
}

/// Mutable indexing, mirroring [`Memory::write`]
///
/// # Panics
///
/// Panics if `address` is negative
impl IndexMut<i64> for Memory {
    fn index_mut(&mut self, address: i64) -> &mut i64 {
        assert!(address >= 0, "negative memory address {address}");
        self.cell_mut(address)
    }
}

impl Clone for Memory {
    fn clone(&self) -> Self {
        // don't copy blank pages
        let pages = self
            .pages
            .iter()
            .filter(|&(_, page)| page.as_ref() != &EMPTY)
            .map(|(&base, page)| (base, page.clone()))
            .collect();
        Self {
            pages,
            highest_written: self.highest_written,
        }
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fmtstruct = fmt.debug_map();
        for base in self.pages.keys().sorted_unstable() {
            if self.pages[base].as_ref() != &EMPTY {
                fmtstruct.entry(
                    &format_args!("{{ page 0x{base:04x} }}"),
                    &format_args!("{:?}", self.pages[base]),
                );
            }
        }
        fmtstruct.finish()
    }
}
