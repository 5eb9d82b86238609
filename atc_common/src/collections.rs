/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::collections::VecDeque;
use std::collections::vec_deque::Iter;

/// a VecDeque with a fixed upper bound on its length. Pushing into a full buffer evicts the oldest element.
/// Note we keep the bound explicitly since VecDeque::capacity() is only a lower bound of what we asked for
#[derive(Debug,Clone)]
pub struct RingBuffer<T> {
    max_len: usize,
    items: VecDeque<T>
}

impl<T> RingBuffer<T> {
    pub fn new (max_len: usize)->Self {
        let max_len = max_len.max(1);
        RingBuffer { max_len, items: VecDeque::with_capacity(max_len) }
    }

    /// push a new element and return the evicted one if the buffer was full
    pub fn push (&mut self, t: T)->Option<T> {
        let evicted = if self.items.len() >= self.max_len { self.items.pop_front() } else { None };
        self.items.push_back(t);
        evicted
    }

    /// replace the most recent element (if any), otherwise push
    pub fn replace_last (&mut self, t: T) {
        self.items.pop_back();
        self.items.push_back(t);
    }

    pub fn max_len (&self)->usize { self.max_len }
    pub fn len (&self)->usize { self.items.len() }
    pub fn is_empty (&self)->bool { self.items.is_empty() }
    pub fn is_full (&self)->bool { self.items.len() >= self.max_len }

    pub fn first (&self)->Option<&T> { self.items.front() }
    pub fn last (&self)->Option<&T> { self.items.back() }

    /// the two most recent elements as (previous,last)
    pub fn last_two (&self)->Option<(&T,&T)> {
        let n = self.items.len();
        if n >= 2 { Some( (&self.items[n-2], &self.items[n-1]) ) } else { None }
    }

    pub fn iter (&self)->Iter<'_,T> { self.items.iter() }

    pub fn clear (&mut self) { self.items.clear() }

    pub fn to_vec (&self)->Vec<T> where T: Clone { self.items.iter().cloned().collect() }
}
