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
use bytes::Bytes;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use searchsign_aws_v4::Credential;
use searchsign_aws_v4::RequestSigner;
use searchsign_core::{Body, Context, SignRequest};
use std::io::Cursor;

criterion_group!(benches, bench);
criterion_main!(benches);

pub fn bench(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("must success");

    let cred = Credential {
        access_key_id: "access_key_id".to_string(),
        secret_access_key: "secret_access_key".to_string(),
        ..Default::default()
    };
    let signer = RequestSigner::new("es", "us-east-1");
    let ctx = Context::new();
    let payload = Bytes::from(vec![b'x'; 1024 * 1024]);

    let mut group = c.benchmark_group("aws_v4");

    group.bench_function("empty_body", |b| {
        b.to_async(&runtime).iter(|| async {
            let (mut parts, _) = http::Request::get("https://127.0.0.1:9200/_search?q=hello")
                .body(())
                .expect("request must be valid")
                .into_parts();

            signer
                .sign_request(&ctx, &mut parts, &mut Body::empty(), &cred)
                .await
                .expect("must success")
        })
    });

    group.bench_function("stream_body_1mib", |b| {
        b.to_async(&runtime).iter(|| async {
            let (mut parts, _) = http::Request::post("https://127.0.0.1:9200/_bulk")
                .body(())
                .expect("request must be valid")
                .into_parts();
            let mut body = Body::stream(Cursor::new(payload.clone()));

            signer
                .sign_request(&ctx, &mut parts, &mut body, &cred)
                .await
                .expect("must success")
        })
    });

    group.finish();
}
