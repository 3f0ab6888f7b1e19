use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use genogram_layout::config::LayoutConfig;
use genogram_layout::genogram::build_genogram_at;
use genogram_layout::grouping::group_families;
use genogram_layout::ir::{Member, Relationship};
use std::hint::black_box;

/// `households` nuclear families of two parents and `children` kids, with
/// one marriage linking consecutive households so components grow.
fn congregation(households: usize, children: usize) -> Vec<Member> {
    let mut members = Vec::new();
    for h in 0..households {
        let dad = format!("h{h}-dad");
        let mom = format!("h{h}-mom");
        let mut father = Member::new(dad.clone())
            .with_name("Padre", &h.to_string())
            .with_sex("M")
            .with_birth_date("1970-01-01")
            .with_relationship(Relationship::new(mom.clone(), "Esposa").cohabiting());
        let mut mother = Member::new(mom.clone())
            .with_name("Madre", &h.to_string())
            .with_sex("F")
            .with_relationship(Relationship::new(dad.clone(), "Esposo").cohabiting());
        for c in 0..children {
            let kid = format!("h{h}-kid{c}");
            father = father.with_relationship(Relationship::new(kid.clone(), "Hijo"));
            mother = mother.with_relationship(Relationship::new(kid.clone(), "Hijo"));
            let mut child = Member::new(kid).with_sex(if c % 2 == 0 { "M" } else { "F" });
            if h % 2 == 1 && c == 0 {
                child = child.with_relationship(Relationship::new(format!("h{}-kid1", h - 1), "Esposa"));
            }
            members.push(child);
        }
        members.push(father);
        members.push(mother);
    }
    members
}

fn bench_grouping(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_families");
    for households in [10usize, 100, 400] {
        let members = congregation(households, 3);
        group.bench_with_input(BenchmarkId::from_parameter(households), &members, |b, members| {
            b.iter(|| group_families(black_box(members)))
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut group = c.benchmark_group("build_genogram");
    for (households, passes) in [(10usize, 0usize), (50, 0), (50, 4)] {
        let members = congregation(households, 3);
        let ids: Vec<String> = members.iter().map(|m| m.id.clone()).collect();
        let config = LayoutConfig {
            ordering_passes: passes,
            ..LayoutConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::new(format!("passes{passes}"), households),
            &(ids, members),
            |b, (ids, members)| {
                b.iter(|| build_genogram_at(black_box(ids), black_box(members), &config, today))
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_grouping, bench_layout);
criterion_main!(benches);
