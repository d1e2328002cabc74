// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use super::{Container, WireWrite};
use crate::buffer::Buffer;
use crate::error::Result;
use crate::value::{Document, Value};

/// Traversal state of one container being written.
#[derive(Debug)]
pub(crate) struct WriteFrame<'a> {
    container: Container<'a>,
    /// Next child to write.
    index: usize,
    /// Offset the container's length is measured from.
    start: usize,
    /// A child frame sits above this one; resume only after it closes.
    child_pending: bool,
}

impl<'a> WriteFrame<'a> {
    fn new(container: Container<'a>, start: usize) -> Self {
        WriteFrame {
            container,
            index: 0,
            start,
            child_pending: false,
        }
    }
}

/// Empties a frame stack so its allocation can go back to a pool that
/// outlives the borrowed document.
pub(crate) fn recycle(mut frames: Vec<WriteFrame<'_>>) -> Vec<WriteFrame<'static>> {
    frames.clear();
    // in-place collect keeps the allocation: same layout, no elements
    frames.into_iter().filter_map(|_| None).collect()
}

/// Writes `root` depth-first with an explicit stack.
///
/// On error the buffer holds a partial document and must be discarded;
/// `frames` is left in an unspecified state and should be cleared.
pub(crate) fn write_document<'a, W: WireWrite>(
    buf: &mut Buffer,
    root: &'a Document,
    frames: &mut Vec<WriteFrame<'a>>,
) -> Result<()> {
    let start = W::open_root(buf, root)?;
    frames.push(WriteFrame::new(Container::Map(root), start));

    while let Some(frame) = frames.last_mut() {
        frame.child_pending = false;
        let container = frame.container;
        let mut child = None;
        while let Some((key, value)) = container.entry(frame.index) {
            frame.index += 1;
            match value {
                Value::Map(doc) => {
                    let nested = Container::Map(doc);
                    child = Some(WriteFrame::new(nested, W::open(buf, key, nested)?));
                    break;
                }
                Value::Array(items) => {
                    let nested = Container::Array(items);
                    child = Some(WriteFrame::new(nested, W::open(buf, key, nested)?));
                    break;
                }
                scalar => W::scalar(buf, key, scalar)?,
            }
        }
        match child {
            Some(child) => {
                frame.child_pending = true;
                frames.push(child);
            }
            None => {
                if let Some(done) = frames.pop() {
                    debug_assert!(!done.child_pending);
                    W::close(buf, done.start)?;
                }
            }
        }
    }
    Ok(())
}
