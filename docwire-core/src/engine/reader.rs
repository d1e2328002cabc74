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

use super::{Bounds, ContainerKind, DecodeContext, Element, WireRead};
use crate::buffer::Reader;
use crate::error::Result;
use crate::value::{Document, Value};

/// A collection under construction.
#[derive(Debug)]
enum Building {
    Map(Document),
    Array(Vec<Value>),
}

impl Building {
    fn new(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Map => Building::Map(Document::new()),
            ContainerKind::Array => Building::Array(Vec::new()),
        }
    }

    #[inline(always)]
    fn kind(&self) -> ContainerKind {
        match self {
            Building::Map(_) => ContainerKind::Map,
            Building::Array(_) => ContainerKind::Array,
        }
    }

    #[inline(always)]
    fn attach(&mut self, key: Option<String>, value: Value) {
        match self {
            Building::Map(doc) => {
                doc.insert(key.unwrap_or_default(), value);
            }
            Building::Array(items) => items.push(value),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Building::Map(doc) => Value::Map(doc),
            Building::Array(items) => Value::Array(items),
        }
    }
}

/// Traversal state of one container being read. The frame owns the
/// collection it fills; the collection moves into its parent when the
/// frame completes.
#[derive(Debug)]
pub(crate) struct ReadFrame {
    container: Building,
    /// Key under which the finished collection attaches to its parent.
    key: Option<String>,
    bounds: Bounds,
    /// A child frame sits above this one; resume only after it completes.
    child_pending: bool,
}

impl ReadFrame {
    fn new(container: Building, key: Option<String>, bounds: Bounds) -> Self {
        ReadFrame {
            container,
            key,
            bounds,
            child_pending: false,
        }
    }
}

/// Reads one document into `root`, replacing its contents.
///
/// The reader's limit is narrowed to the current frame's end before each
/// element, so no element can be decoded from outside its parent's range.
/// On error `root` holds an unspecified partial result and `frames` should
/// be cleared.
pub(crate) fn read_document<R: WireRead>(
    reader: &mut Reader<'_>,
    ctx: &DecodeContext<'_>,
    root: &mut Document,
    frames: &mut Vec<ReadFrame>,
) -> Result<()> {
    let bounds = R::open_root(reader, ctx)?;
    root.clear();
    let container = Building::Map(std::mem::take(root));
    frames.push(ReadFrame::new(container, None, bounds));

    while let Some(frame) = frames.last_mut() {
        frame.child_pending = false;
        reader.set_limit(frame.bounds.end);
        let kind = frame.container.kind();
        let child = loop {
            match R::next(reader, &mut frame.bounds, kind, ctx)? {
                Element::Scalar(key, value) => frame.container.attach(key, value),
                Element::Open { key, kind, bounds } => {
                    break Some(ReadFrame::new(Building::new(kind), key, bounds));
                }
                Element::End => break None,
            }
        };
        if let Some(child) = child {
            frame.child_pending = true;
            frames.push(child);
            continue;
        }
        let done = match frames.pop() {
            Some(done) => done,
            None => break,
        };
        debug_assert!(!done.child_pending);
        match frames.last_mut() {
            Some(parent) => parent.container.attach(done.key, done.container.into_value()),
            None => {
                if let Building::Map(doc) = done.container {
                    *root = doc;
                }
            }
        }
    }
    Ok(())
}
