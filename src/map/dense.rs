use std::{
    fmt,
    iter::FusedIterator,
    marker::PhantomData,
    ops::{Index, IndexMut},
};

use stable_vec::{
    StableVec,
    core::DefaultCore,
    iter::{Indices, Iter as SvIter, IterMut as SvIterMut, Values as SvValues},
};

use crate::handle::{hsize, Handle};


/// An arena that stores one value per handle, with generation-checked
/// handles.
///
/// Elements live in a `StableVec`, so removing one does not move any other
/// element. Every slot has a generation counter: removing an element bumps
/// the generation of its slot, and a handle is only accepted if its
/// generation matches. Freed slots are reused by later `push` calls (most
/// recently freed slot first).
///
/// This is the element store of [`HalfEdgeMesh`][crate::HalfEdgeMesh]: one
/// `DenseMap` for vertices, one for edges (each edge stores both of its half
/// edges) and one for faces.
///
/// # Example
///
/// ```
/// use meshedit::{
///     VertexHandle,
///     handle::Handle,
///     map::DenseMap,
/// };
///
/// let mut map: DenseMap<VertexHandle, &str> = DenseMap::new();
/// let bob = map.push("bob");
/// assert_eq!(map.get_ref(bob), Some(&"bob"));
///
/// map.remove(bob);
/// let lena = map.push("lena");
///
/// // Same slot, different generation: the old handle is dead.
/// assert_eq!(bob.idx(), lena.idx());
/// assert_eq!(map.get_ref(bob), None);
/// assert_eq!(map[lena], "lena");
/// ```
#[derive(Clone)]
pub struct DenseMap<H: Handle, T> {
    vec: StableVec<T>,
    generations: Vec<hsize>,
    free: Vec<hsize>,
    _dummy: PhantomData<H>,
}

impl<H: Handle, T> DenseMap<H, T> {
    /// Creates an empty `DenseMap`.
    pub fn new() -> Self {
        Self {
            vec: StableVec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            _dummy: PhantomData,
        }
    }

    /// Creates an empty `DenseMap` with space for `cap` elements.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            vec: StableVec::with_capacity(cap),
            generations: Vec::with_capacity(cap),
            free: Vec::new(),
            _dummy: PhantomData,
        }
    }

    /// Inserts `elem` into a free slot and returns its handle.
    pub fn push(&mut self, elem: T) -> H {
        match self.free.pop() {
            Some(idx) => {
                let i = idx as usize;
                self.vec.reserve_for(i);
                let old = self.vec.insert(i, elem);
                debug_assert!(old.is_none(), "free slot {} was occupied", idx);
                H::new(idx, self.generations[i])
            }
            None => {
                let i = self.vec.push(elem);
                if i >= self.generations.len() {
                    self.generations.resize(i + 1, 0);
                }
                H::new(i as hsize, self.generations[i])
            }
        }
    }

    /// Returns the handle the next `push` will return.
    pub fn next_push_handle(&self) -> H {
        match self.free.last() {
            Some(&idx) => H::new(idx, self.generations[idx as usize]),
            None => {
                let i = self.vec.next_push_index();
                H::new(i as hsize, self.generations.get(i).cloned().unwrap_or(0))
            }
        }
    }

    /// Removes the element referred to by `handle` and returns it. Returns
    /// `None` if the handle is stale or was never valid.
    pub fn remove(&mut self, handle: H) -> Option<T> {
        if !self.contains_handle(handle) {
            return None;
        }

        let i = handle.to_usize();
        let out = self.vec.remove(i);
        self.generations[i] = self.generations[i].wrapping_add(1);
        self.free.push(handle.idx());
        out
    }

    /// Returns `true` if `handle` refers to a live element of this map.
    pub fn contains_handle(&self, handle: H) -> bool {
        let i = handle.to_usize();
        self.vec.has_element_at(i) && self.generations.get(i) == Some(&handle.generation())
    }

    pub fn get_ref(&self, handle: H) -> Option<&T> {
        if self.contains_handle(handle) {
            self.vec.get(handle.to_usize())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        if self.contains_handle(handle) {
            self.vec.get_mut(handle.to_usize())
        } else {
            None
        }
    }

    /// Number of live elements.
    pub fn num_elements(&self) -> hsize {
        self.vec.num_elements() as hsize
    }

    pub fn is_empty(&self) -> bool {
        self.vec.num_elements() == 0
    }

    /// Removes all elements. All handles handed out so far become stale.
    pub fn clear(&mut self) {
        for i in self.vec.indices().collect::<Vec<_>>() {
            self.generations[i] = self.generations[i].wrapping_add(1);
        }
        self.vec.clear();
        self.free.clear();
    }

    /// Iterates over all live elements in slot order.
    pub fn iter(&self) -> Iter<'_, H, T> {
        Iter { iter: self.vec.iter(), generations: &self.generations, _dummy: PhantomData }
    }

    /// Iterates over the handles of all live elements in slot order.
    pub fn handles(&self) -> Handles<'_, H, T> {
        Handles { iter: self.vec.indices(), generations: &self.generations, _dummy: PhantomData }
    }

    pub fn values(&self) -> SvValues<'_, T, DefaultCore<T>> {
        self.vec.values()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, H, T> {
        IterMut {
            iter: self.vec.iter_mut(),
            generations: &self.generations,
            _dummy: PhantomData,
        }
    }
}

impl<H: Handle, T> Default for DenseMap<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle, T> Index<H> for DenseMap<H, T> {
    type Output = T;
    fn index(&self, handle: H) -> &Self::Output {
        match self.get_ref(handle) {
            None => panic!("no element found for handle '{:?}' (stale or foreign handle)", handle),
            Some(r) => r,
        }
    }
}

impl<H: Handle, T> IndexMut<H> for DenseMap<H, T> {
    fn index_mut(&mut self, handle: H) -> &mut Self::Output {
        match self.get_mut(handle) {
            None => panic!("no element found for handle '{:?}' (stale or foreign handle)", handle),
            Some(r) => r,
        }
    }
}

impl<H: Handle, T: fmt::Debug> fmt::Debug for DenseMap<H, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}


// ===== Iterator wrappers =======================================================================

/// Iterator over `(handle, &element)` pairs of a [`DenseMap`].
#[derive(Debug, Clone)]
pub struct Iter<'map, H: Handle, T> {
    iter: SvIter<'map, T, DefaultCore<T>>,
    generations: &'map [hsize],
    _dummy: PhantomData<H>,
}

impl<'map, H: Handle, T> Iterator for Iter<'map, H, T> {
    type Item = (H, &'map T);
    fn next(&mut self) -> Option<Self::Item> {
        let generations = self.generations;
        self.iter.next().map(|(i, e)| (H::new(i as hsize, generations[i]), e))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<H: Handle, T> FusedIterator for Iter<'_, H, T> {}

/// Iterator over `(handle, &mut element)` pairs of a [`DenseMap`].
#[derive(Debug)]
pub struct IterMut<'map, H: Handle, T> {
    iter: SvIterMut<'map, T, DefaultCore<T>>,
    generations: &'map [hsize],
    _dummy: PhantomData<H>,
}

impl<'map, H: Handle, T> Iterator for IterMut<'map, H, T> {
    type Item = (H, &'map mut T);
    fn next(&mut self) -> Option<Self::Item> {
        let generations = self.generations;
        self.iter.next().map(|(i, e)| (H::new(i as hsize, generations[i]), e))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Iterator over the handles of a [`DenseMap`].
#[derive(Debug, Clone)]
pub struct Handles<'map, H: Handle, T> {
    iter: Indices<'map, T, DefaultCore<T>>,
    generations: &'map [hsize],
    _dummy: PhantomData<H>,
}

impl<'map, H: Handle, T> Iterator for Handles<'map, H, T> {
    type Item = H;
    fn next(&mut self) -> Option<Self::Item> {
        let generations = self.generations;
        self.iter.next().map(|i| H::new(i as hsize, generations[i]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<H: Handle, T> FusedIterator for Handles<'_, H, T> {}


// ===== Tests ===================================================================================
