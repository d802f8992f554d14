// Yamlet - YAML parser, document model, and emitter
//
// Copyright (c) 2025 the Yamlet contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parse throughput benchmarks: event streaming vs. document building.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use yamlet_core::{Document, ParseOptions, Parser};

fn synthetic_document(entries: usize) -> String {
    let mut out = String::new();
    for i in 0..entries {
        out.push_str(&format!(
            "record-{i}:\n  id: {i}\n  name: \"entry number {i}\"\n  tags: [a, b, c]\n  active: true\n"
        ));
    }
    out
}

fn bench_events(c: &mut Criterion) {
    let input = synthetic_document(200);
    let mut group = c.benchmark_group("events");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.bench_function("next_event", |b| {
        b.iter(|| {
            let mut parser = Parser::from_str(&input, ParseOptions::default());
            let mut count = 0usize;
            while let Some(event) = parser.next_event().unwrap() {
                black_box(&event);
                count += 1;
            }
            count
        });
    });
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let input = synthetic_document(200);
    let mut group = c.benchmark_group("build");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.bench_function("document", |b| {
        b.iter(|| {
            let doc = Document::from_yaml_str(&input).unwrap();
            black_box(doc.node_count())
        });
    });
    group.finish();
}

criterion_group!(benches, bench_events, bench_build);
criterion_main!(benches);
