// this module contains a data structure to efficiently map a large noncensecutive
// id space into a smaller consecutive id space from 0 to n where the order is preserved.
// used to renumber vertices when extracting vertex induced subgraphs.

use std::cmp::min;
use std::mem::size_of;

// number of bits (not bytes) in one 64 bit uint
const STORAGE_BITS: usize = size_of::<u64>() * 8;

// bits covered by one prefix sum entry, one cache line worth of u64s
const BITS_PER_PREFIX: usize = 64 * 8;
const INTS_PER_PREFIX: usize = BITS_PER_PREFIX / STORAGE_BITS;

/// A fixed size vector of bits with access to the underlying u64s for popcounts.
#[derive(Debug, Clone, PartialEq)]
pub struct BitVec {
    data: Vec<u64>,
    size: usize,
}

impl BitVec {
    /// A vector of `size` unset bits.
    pub fn new(size: usize) -> BitVec {
        // ceiling to the right number of u64s
        let num_ints = (size + STORAGE_BITS - 1) / STORAGE_BITS;
        BitVec { data: vec![0; num_ints], size }
    }

    /// A vector of `size` set bits.
    pub fn new_set(size: usize) -> BitVec {
        let mut bits = BitVec::new(size);
        bits.set_all();
        bits
    }

    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.size, "index: {} size: {}", index, self.size);
        // shifting a 1 bit to the right place and masking
        self.data[index / STORAGE_BITS] & (1 << (index % STORAGE_BITS)) != 0
    }

    pub fn set(&mut self, index: usize) {
        assert!(index < self.size, "index: {} size: {}", index, self.size);
        self.data[index / STORAGE_BITS] |= 1 << (index % STORAGE_BITS);
    }

    pub fn unset(&mut self, index: usize) {
        assert!(index < self.size, "index: {} size: {}", index, self.size);
        self.data[index / STORAGE_BITS] &= !(1 << (index % STORAGE_BITS));
    }

    pub fn set_all(&mut self) {
        for val in &mut self.data {
            *val = !0;
        }
        // bits beyond size must stay zero, the popcounts rely on it
        let used = self.size % STORAGE_BITS;
        if used != 0 {
            if let Some(last) = self.data.last_mut() {
                *last = (1 << used) - 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|v| v.count_ones() as usize).sum()
    }
}

// the actual map data structure.
// made up of the bitvec with one bit for each id
// and a vec containing prefix sums of the number of elements
// the local id of a contained id is the number of bits set in the bitvector before the id itself.
// the prefix sum array is there so we do not need to always count everything before
// but just the ones in the current block.

#[derive(Debug)]
pub struct RankSelectMap {
    contained_keys_flags: BitVec,
    prefix_sum: Vec<usize>,
}

impl RankSelectMap {
    pub fn new(bit_vec: BitVec) -> RankSelectMap {
        let max_index = bit_vec.len();
        let mut this = RankSelectMap {
            contained_keys_flags: bit_vec,
            // the number of elements in the prefix vector is ceiled and one extra element
            // is added in the back containing the total number of elements
            prefix_sum: vec![0; (max_index + BITS_PER_PREFIX - 1) / BITS_PER_PREFIX + 1],
        };
        this.compile();
        this
    }

    /// Number of contained keys
    pub fn len(&self) -> usize {
        self.prefix_sum.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn compile(&mut self) {
        let mut previous = 0;
        // we start from one here, since the first prefix is always zero
        for index in 1..self.prefix_sum.len() {
            self.prefix_sum[index] = self.bit_count_entire_range(index - 1) + previous;
            previous = self.prefix_sum[index];
        }
    }

    fn bit_count_entire_range(&self, range_index: usize) -> usize {
        // make sure to not go over the edge
        let range = (range_index * INTS_PER_PREFIX)..min((range_index + 1) * INTS_PER_PREFIX, self.contained_keys_flags.data.len());
        self.contained_keys_flags.data[range].iter().map(|num| num.count_ones() as usize).sum()
    }

    /// The local id of `key` or `None` if it is not contained.
    pub fn get(&self, key: usize) -> Option<usize> {
        if key < self.contained_keys_flags.size && self.contained_keys_flags.get(key) {
            Some(self.prefix_sum[key / BITS_PER_PREFIX] + self.bit_count_partial_range(key))
        } else {
            None
        }
    }

    fn bit_count_partial_range(&self, key: usize) -> usize {
        let index = key / STORAGE_BITS; // the index of the number containing the bit
        let mask = (1u64 << (key % STORAGE_BITS)) - 1;
        let num = (self.contained_keys_flags.data[index] & mask).count_ones() as usize; // num ones in the number before key

        let range = ((index / INTS_PER_PREFIX) * INTS_PER_PREFIX)..index; // the range over the numbers before our number
        let sum: usize = self.contained_keys_flags.data[range].iter().map(|num| num.count_ones() as usize).sum();
        sum + num
    }
}
