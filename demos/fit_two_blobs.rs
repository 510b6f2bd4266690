use lloyd::{elbow, ElbowConfig, Kmeans, KmeansPlusPlus};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two obvious clusters in 2D.
    let points: Vec<Vec<f64>> = vec![
        // Cluster A (near (0,0))
        vec![0.0, 0.0],
        vec![0.1, 0.0],
        vec![0.0, 0.1],
        vec![0.1, 0.1],
        // Cluster B (near (10,10))
        vec![10.0, 10.0],
        vec![10.1, 10.0],
        vec![10.0, 10.1],
        vec![10.1, 10.1],
    ];

    let seeding = KmeansPlusPlus::new(2).with_seed(0).select(&points)?;
    let fit = Kmeans::new(2)
        .with_max_iter(200)
        .with_epsilon(1e-4)
        .fit_report(&seeding.centroids, &points)?;

    // Same layout the legacy driver printed: seed indices, then centroids.
    println!(
        "{}",
        seeding
            .indices
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",")
    );
    for centroid in &fit.centroids {
        println!(
            "{}",
            centroid
                .iter()
                .map(|x| format!("{x:.4}"))
                .collect::<Vec<_>>()
                .join(",")
        );
    }
    println!(
        "iterations={} converged={}",
        fit.iterations, fit.converged
    );

    for point in elbow(&points, 1..=4, &ElbowConfig::default())? {
        println!("k={} inertia={:.4}", point.k, point.inertia);
    }

    Ok(())
}
