/// Performance benchmarks for CIGAR expansion and stream extraction
///
/// Run with: cargo bench
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fiveprime::cigar::expand_cigar;
use fiveprime::{extract_five_prime_bases, ExtractConfig};

/// Generate synthetic SAM records alternating strands and spliced/unspliced reads
fn generate_synthetic_sam(num_reads: usize) -> String {
    let mut sam = String::from("@HD\tVN:1.6\tSO:unsorted\n@SQ\tSN:chr1\tLN:10000000\n");
    let seq = "ACGT".repeat(25);
    let qual = "I".repeat(100);

    for i in 0..num_reads {
        let flag = if i % 2 == 0 { 0 } else { 16 };
        let pos = (i * 137) % 9_000_000 + 1;
        let cigar = if i % 3 == 0 { "50M2000N50M" } else { "5S90M2I3M" };
        sam.push_str(&format!(
            "read{i}\t{flag}\tchr1\t{pos}\t60\t{cigar}\t*\t0\t0\t{seq}\t{qual}\n"
        ));
    }

    sam
}

fn bench_expand_cigar(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_cigar");

    for cigar in ["100M", "5S90M2I3M", "50M2000N50M", "*"].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(cigar), cigar, |b, &cigar| {
            b.iter(|| expand_cigar(black_box(1_000_000), black_box(100), black_box(cigar)))
        });
    }

    group.finish();
}

fn bench_stream_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_extraction");
    let config = ExtractConfig::default();

    for size in [1000, 10000, 100000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.sample_size(10);

        let sam = generate_synthetic_sam(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &sam, |b, sam| {
            b.iter(|| {
                let mut output = Vec::with_capacity(sam.len() / 4);
                extract_five_prime_bases(sam.as_bytes(), &mut output, &config).unwrap();
                black_box(output)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_expand_cigar, bench_stream_extraction);
criterion_main!(benches);
